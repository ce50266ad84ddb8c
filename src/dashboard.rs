use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use bytes::{BufMut, Bytes, BytesMut};

use html_escape::{encode_script_to_writer, encode_text_to_writer};

use tempfile::NamedTempFile;

use log::{debug, info};

use serde::Serialize;

use smartstring::alias::{String as SmartString};

use chrono::NaiveDate;

use super::aggregate::{CaseBreakdown, FatalityRate, LocationTotals, OutbreakRatio, Rollup};
use super::config::Config;
use super::error::{Error, Result};
use super::geo::{MapDataset, MapPoint};
use super::pipeline::Pipeline;
use super::records::LocationLevel;
use super::resample::Granularity;
use super::summary::{GlobalSummary, LocationSummary};
use super::views::{LevelViews, LocationProfileViews, TimeViews, WorldWideViews};


pub static WORLD_WIDE_TAB: &'static str = "World Wide";

mod color {
	pub static COUNTRY: &'static str = "#136207";
	pub static DAILY_CASES: &'static str = "#4f74e3";
	pub static TOTAL_CASES: &'static str = "#002952";
	pub static DAILY_DEATHS: &'static str = "#c2233d";
	pub static TOTAL_DEATHS: &'static str = "#420000";
	pub static BREAKDOWN: [&'static str; 3] = ["#002952", "#006ab8", "#97a3ff"];
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
	Line,
	HorizontalBar,
	StackedBar,
	Map,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Point {
	Value{label: SmartString, value: f64},
	/// A value drawn on a transformed scale, with the number it stands for.
	Scaled{label: SmartString, value: f64, actual: u64},
	Marker{label: SmartString, x: f64, y: f64, size: f64, cases: u64, deaths: u64},
}

impl Point {
	pub fn value(&self) -> f64 {
		match self {
			Self::Value{value, ..} | Self::Scaled{value, ..} => *value,
			Self::Marker{size, ..} => *size,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
	pub name: SmartString,
	pub color: &'static str,
	pub points: Vec<Point>,
}

/// Visual description of one chart. Charts never aggregate; every value in
/// a series is copied or rescaled from an already computed view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
	pub kind: ChartKind,
	pub title: String,
	pub x_label: &'static str,
	pub y_label: &'static str,
	pub series: Vec<Series>,
}


fn series(name: &str, color: &'static str, points: Vec<Point>) -> Series {
	Series{name: name.into(), color, points}
}

fn date_label(date: NaiveDate) -> SmartString {
	date.to_string().into()
}

fn row_label(location: &Option<SmartString>, country: &SmartString, level: LocationLevel) -> SmartString {
	match (level, location) {
		(LocationLevel::Country, _) | (_, None) => country.clone(),
		(_, Some(loc)) => {
			let mut s = loc.clone();
			s.push_str(" / ");
			s.push_str(country);
			s
		},
	}
}


pub fn infected_countries_chart(views: &TimeViews) -> Chart {
	Chart{
		kind: ChartKind::Line,
		title: format!("Number Of Infected Countries Per {}", views.granularity.period_name()),
		x_label: "Date",
		y_label: "Countries",
		series: vec![series("Countries", color::COUNTRY, views.infected_countries.iter().map(|b| Point::Value{
			label: date_label(b.date),
			value: b.countries as f64,
		}).collect())],
	}
}

fn rollup_chart(rollup: &[Rollup], granularity: Granularity, noun: &'static str, colors: (&'static str, &'static str)) -> Chart {
	let period = granularity.period_name();
	Chart{
		kind: ChartKind::Line,
		title: format!("Number Of {} Per {} And In Total", noun, period),
		x_label: "Date",
		y_label: noun,
		series: vec![
			series(&format!("{} Per {}", noun, period), colors.0, rollup.iter().map(|b| Point::Value{
				label: date_label(b.date),
				value: b.period as f64,
			}).collect()),
			series(&format!("Total {}", noun), colors.1, rollup.iter().map(|b| Point::Value{
				label: date_label(b.date),
				value: b.total as f64,
			}).collect()),
		],
	}
}

pub fn deaths_chart(views: &TimeViews) -> Chart {
	rollup_chart(&views.deaths, views.granularity, "Deaths", (color::DAILY_DEATHS, color::TOTAL_DEATHS))
}

pub fn cases_chart(views: &TimeViews) -> Chart {
	rollup_chart(&views.cases, views.granularity, "Cases", (color::DAILY_CASES, color::TOTAL_CASES))
}

pub fn fatality_over_time_chart(views: &TimeViews) -> Chart {
	Chart{
		kind: ChartKind::Line,
		title: format!("Fatality Rate Per {}", views.granularity.period_name()),
		x_label: "Date",
		y_label: "Fatality Rate (%)",
		series: vec![series("Fatality Rate", color::DAILY_DEATHS, views.fatality_rate.iter().map(|b| Point::Value{
			label: date_label(b.date),
			value: b.fatality_rate.value(),
		}).collect())],
	}
}

pub fn fatality_by_location_chart(rows: &[FatalityRate], level: LocationLevel) -> Chart {
	Chart{
		kind: ChartKind::HorizontalBar,
		title: "Fatality Rate Per Location".into(),
		x_label: "Fatality Rate (%)",
		y_label: "Location",
		series: vec![series("Fatality Rate", color::DAILY_DEATHS, rows.iter().map(|r| Point::Value{
			label: row_label(&r.location, &r.country, level),
			value: r.fatality_rate.value(),
		}).collect())],
	}
}

pub fn case_breakdown_chart(rows: &[CaseBreakdown], level: LocationLevel, epicenter: &str) -> Chart {
	let label = |r: &CaseBreakdown| row_label(&r.location, &r.country, level);
	Chart{
		kind: ChartKind::StackedBar,
		title: format!("Cases With And Without Travel History To {}", epicenter),
		x_label: "Cases",
		y_label: "Location",
		series: vec![
			series(&format!("Travel History To {}", epicenter), color::BREAKDOWN[0], rows.iter().map(|r| Point::Value{
				label: label(r),
				value: r.travel_history as f64,
			}).collect()),
			series(&format!("Transmission Outside {}", epicenter), color::BREAKDOWN[1], rows.iter().map(|r| Point::Value{
				label: label(r),
				value: r.transmission_outside as f64,
			}).collect()),
			series("Under Investigation", color::BREAKDOWN[2], rows.iter().map(|r| Point::Value{
				label: label(r),
				value: r.under_investigation as f64,
			}).collect()),
		],
	}
}

pub fn outbreak_chart(rows: &[OutbreakRatio], level: LocationLevel, epicenter: &str) -> Chart {
	Chart{
		kind: ChartKind::HorizontalBar,
		title: format!("Epidemic Outbreak: Share Of Cases Without Travel History To {}", epicenter),
		x_label: "Outbreak Ratio (%)",
		y_label: "Location",
		series: vec![series("Outbreak Ratio", color::DAILY_CASES, rows.iter().map(|r| Point::Value{
			label: row_label(&r.location, &r.country, level),
			value: r.outbreak_ratio.value(),
		}).collect())],
	}
}

/// Bar length for a case count on the cases/deaths chart.
pub fn cases_log(total_cases: u64) -> f64 {
	if total_cases == 0 {
		return 0.
	}
	(total_cases as f64 + 0.1).ln() * 50.
}

/// Total cases and deaths as stacked bars on a log scale. The deaths part
/// takes the fatality-rate share of the case bar.
pub fn cases_deaths_chart(totals: &[LocationTotals], fatality: &[FatalityRate], level: LocationLevel) -> Chart {
	let rates: HashMap<&str, f64> = fatality.iter()
		.map(|r| (r.country.as_str(), r.fatality_rate.value()))
		.collect();
	let mut cases = Vec::with_capacity(totals.len());
	let mut deaths = Vec::with_capacity(totals.len());
	for r in totals.iter() {
		let rate = rates.get(r.country.as_str()).copied().unwrap_or(0.);
		let c = cases_log(r.total_cases);
		let d = c * rate / 100.;
		let label = row_label(&r.location, &r.country, level);
		cases.push(Point::Scaled{label: label.clone(), value: c - d, actual: r.total_cases});
		deaths.push(Point::Scaled{label, value: d, actual: r.total_deaths});
	}
	Chart{
		kind: ChartKind::StackedBar,
		title: "Total Cases And Deaths Confirmed".into(),
		x_label: "Cases (log scale)",
		y_label: "Location",
		series: vec![
			series("Cases", color::TOTAL_CASES, cases),
			series("Deaths", color::DAILY_DEATHS, deaths),
		],
	}
}

fn markers(points: &[MapPoint]) -> Vec<Point> {
	points.iter().map(|p| Point::Marker{
		label: p.country.clone(),
		x: p.merc_long,
		y: p.merc_lat,
		size: p.circle_size,
		cases: p.total_cases,
		deaths: p.total_deaths,
	}).collect()
}

pub fn map_chart(map: &MapDataset) -> Chart {
	Chart{
		kind: ChartKind::Map,
		title: "Infected Locations Over The World".into(),
		x_label: "",
		y_label: "",
		series: vec![
			series("Country Without Deaths", color::DAILY_CASES, markers(&map.without_deaths)),
			series("Country With Deaths", color::DAILY_DEATHS, markers(&map.with_deaths)),
		],
	}
}

fn charts(map: &MapDataset, tables: &LevelViews, daily: &TimeViews, monthly: &TimeViews, epicenter: &str) -> Vec<Chart> {
	vec![
		map_chart(map),
		infected_countries_chart(daily),
		infected_countries_chart(monthly),
		deaths_chart(daily),
		deaths_chart(monthly),
		cases_chart(daily),
		cases_chart(monthly),
		fatality_over_time_chart(daily),
		fatality_over_time_chart(monthly),
		fatality_by_location_chart(&tables.fatality_rate, tables.level),
		case_breakdown_chart(&tables.case_breakdown, tables.level, epicenter),
		outbreak_chart(&tables.outbreak_ratio, tables.level, epicenter),
		cases_deaths_chart(&tables.totals, &tables.fatality_rate, tables.level),
	]
}


#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TabSummary {
	WorldWide(GlobalSummary),
	Location(LocationSummary),
}

impl TabSummary {
	/// Label/value pairs for the summary box at the top of a tab.
	pub fn lines(&self) -> Vec<(String, String)> {
		match self {
			Self::WorldWide(s) => vec![
				("Period".into(), format!("{} to {} ({} days)", s.date_summary.from, s.date_summary.to, s.date_summary.num_of_days)),
				("Countries".into(), s.location_summary.num_of_countries.to_string()),
				("Regions".into(), s.location_summary.num_of_regions.to_string()),
				("Continents".into(), s.location_summary.num_of_continents.to_string()),
				(format!("Cases in {}", s.epicenter), s.cases_summary.inside_epicenter.to_string()),
				(format!("Cases outside {}", s.epicenter), s.cases_summary.outside_epicenter.to_string()),
				("Total cases".into(), s.cases_summary.total.to_string()),
				(format!("Deaths in {}", s.epicenter), s.deaths_summary.inside_epicenter.to_string()),
				(format!("Deaths outside {}", s.epicenter), s.deaths_summary.outside_epicenter.to_string()),
				("Total deaths".into(), s.deaths_summary.total.to_string()),
				("Fatality rate".into(), format!("{}%", s.deaths_summary.fatality_rate)),
				("WHO risk (China)".into(), risk_text(&s.who_risk_assessment.china)),
				("WHO risk (outside China)".into(), risk_text(&s.who_risk_assessment.outside_of_china)),
				("WHO risk (global)".into(), risk_text(&s.who_risk_assessment.globally)),
			],
			Self::Location(s) => vec![
				("Location".into(), format!("{} ({})", s.location_name, s.selected_level)),
				("Period".into(), format!("{} to {}", s.from_date, s.to_date)),
				("Total cases".into(), s.num_cases.to_string()),
				("Total deaths".into(), s.num_deaths.to_string()),
				("Fatality rate".into(), format!("{}%", s.fatality_rate)),
				("First case reported".into(), s.first_reported_cases.to_string()),
				("First death reported".into(), s.first_reported_deaths.to_string()),
			],
		}
	}
}

fn risk_text(level: &Option<SmartString>) -> String {
	match level {
		Some(v) => v.to_string(),
		None => "n/a".into(),
	}
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tab {
	pub title: SmartString,
	pub summary: TabSummary,
	pub charts: Vec<Chart>,
}

impl Tab {
	pub fn world_wide(views: &WorldWideViews, epicenter: &str) -> Self {
		Self{
			title: WORLD_WIDE_TAB.into(),
			summary: TabSummary::WorldWide(views.summary.clone()),
			charts: charts(&views.map, &views.country, &views.daily, &views.monthly, epicenter),
		}
	}

	pub fn location_profile(views: &LocationProfileViews, epicenter: &str) -> Self {
		Self{
			title: title_case(&views.location),
			summary: TabSummary::Location(views.summary.clone()),
			charts: charts(&views.map, &views.tables, &views.daily, &views.monthly, epicenter),
		}
	}
}

/// Capitalize the first letter of each word, lowercase the rest.
pub fn title_case(s: &str) -> SmartString {
	let mut result = SmartString::new();
	let mut at_word_start = true;
	for ch in s.chars() {
		if at_word_start {
			for c in ch.to_uppercase() {
				result.push(c);
			}
		} else {
			for c in ch.to_lowercase() {
				result.push(c);
			}
		}
		at_word_start = ch.is_whitespace() || ch == '-';
	}
	result
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
	pub title: String,
	pub as_of: NaiveDate,
	pub active_tab: usize,
	pub tabs: Vec<Tab>,
}

impl Dashboard {
	/// One world-wide tab, then one tab per continent on the map.
	pub fn build(pipeline: &Pipeline, title: &str, as_of: Option<NaiveDate>) -> Self {
		let as_of = as_of.unwrap_or_else(|| pipeline.latest_date());
		let epicenter = pipeline.epicenter();
		let mut tabs = vec![Tab::world_wide(&pipeline.world_wide(Some(as_of)), epicenter)];
		for continent in pipeline.continents(Some(as_of)) {
			let views = pipeline.location_profile(Some(as_of), LocationLevel::Continent, &continent);
			tabs.push(Tab::location_profile(&views, epicenter));
		}
		debug!("built dashboard with {} tabs as of {}", tabs.len(), as_of);
		Self{
			title: title.into(),
			as_of,
			active_tab: 0,
			tabs,
		}
	}

	pub fn render_html(&self) -> Result<Bytes> {
		let data = serde_json::to_string(self)?;
		let mut w = BytesMut::new().writer();
		self.write_html(&mut w, &data).expect("write to BytesMut failed");
		Ok(w.into_inner().freeze())
	}

	fn write_html<W: Write>(&self, w: &mut W, data: &str) -> std::io::Result<()> {
		w.write_all(b"<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>")?;
		encode_text_to_writer(&self.title, w)?;
		w.write_all(b"</title>\n<style>\n")?;
		w.write_all(STYLE.as_bytes())?;
		w.write_all(b"</style>\n</head>\n<body>\n<div class=\"board-root\" align=\"center\">\n<h1>")?;
		encode_text_to_writer(&self.title, w)?;
		w.write_all(b"</h1>\n<nav class=\"board-tabs\">\n")?;
		for (i, tab) in self.tabs.iter().enumerate() {
			let class = if i == self.active_tab { "board-tab active" } else { "board-tab" };
			write!(w, "<button class=\"{}\" data-tab=\"{}\">", class, i)?;
			encode_text_to_writer(&tab.title, w)?;
			w.write_all(b"</button>\n")?;
		}
		w.write_all(b"</nav>\n")?;
		for (i, tab) in self.tabs.iter().enumerate() {
			let hidden = if i == self.active_tab { "" } else { " hidden" };
			write!(w, "<section class=\"board-panel\" id=\"tab-{}\"{}>\n<dl class=\"board-summary\">\n", i, hidden)?;
			for (label, value) in tab.summary.lines() {
				w.write_all(b"<dt>")?;
				encode_text_to_writer(&label, w)?;
				w.write_all(b"</dt><dd>")?;
				encode_text_to_writer(&value, w)?;
				w.write_all(b"</dd>\n")?;
			}
			w.write_all(b"</dl>\n")?;
			for (j, chart) in tab.charts.iter().enumerate() {
				write!(w, "<figure class=\"board-chart\" data-tab=\"{}\" data-chart=\"{}\"><figcaption>", i, j)?;
				encode_text_to_writer(&chart.title, w)?;
				w.write_all(b"</figcaption></figure>\n")?;
			}
			w.write_all(b"</section>\n")?;
		}
		w.write_all(b"</div>\n<script type=\"application/json\" id=\"board-data\">")?;
		encode_script_to_writer(data, w)?;
		w.write_all(b"</script>\n<script>\n")?;
		w.write_all(SCRIPT.as_bytes())?;
		w.write_all(b"</script>\n</body>\n</html>\n")?;
		Ok(())
	}
}

static STYLE: &'static str = "\
.board-root { margin: 0 auto; max-width: 1200px; font-family: sans-serif; }
.board-tab { font-style: normal; font-size: medium; border: none; padding: 0.5em 1em; }
.board-tab.active { background-color: #2F4F4F; color: white; font-weight: bold; }
.board-summary { display: grid; grid-template-columns: max-content max-content; gap: 0.2em 1em; text-align: left; }
.board-chart { display: inline-block; width: 600px; min-height: 350px; margin: 0.5em; }
.board-chart svg { background: #fafafa; }
";

static SCRIPT: &'static str = "\
var board = JSON.parse(document.getElementById('board-data').textContent);
var SVG_NS = 'http://www.w3.org/2000/svg';
var W = 600, H = 350, PAD = 40, MERC_EXTENT = 20037508.34;

function el(name, attrs, parent) {
  var e = document.createElementNS(SVG_NS, name);
  Object.keys(attrs).forEach(function (k) { e.setAttribute(k, attrs[k]); });
  if (parent) { parent.appendChild(e); }
  return e;
}

function label(parent, x, y, s, anchor, color) {
  var t = el('text', {x: x, y: y, 'font-size': 10, 'text-anchor': anchor || 'start', fill: color || '#333'}, parent);
  t.textContent = s;
}

function tooltip(parent, s) {
  el('title', {}, parent).textContent = s;
}

function maxValue(chart, stacked) {
  var max = 0, sums = {};
  chart.series.forEach(function (s) {
    s.points.forEach(function (p) {
      sums[p.label] = (stacked ? (sums[p.label] || 0) : 0) + p.value;
      max = Math.max(max, sums[p.label]);
    });
  });
  return max || 1;
}

function drawLine(svg, chart) {
  var max = maxValue(chart, false);
  chart.series.forEach(function (s, si) {
    var step = s.points.length > 1 ? (W - 2 * PAD) / (s.points.length - 1) : 0;
    var coords = s.points.map(function (p, i) {
      return (PAD + i * step) + ',' + (H - PAD - p.value / max * (H - 2 * PAD));
    });
    el('polyline', {points: coords.join(' '), fill: 'none', stroke: s.color, 'stroke-width': 2}, svg);
    label(svg, PAD + 4, 12 + 12 * si, s.name, 'start', s.color);
  });
  var first = chart.series.length ? chart.series[0].points : [];
  if (first.length) {
    label(svg, PAD, H - PAD + 14, first[0].label);
    label(svg, W - PAD, H - PAD + 14, first[first.length - 1].label, 'end');
  }
  label(svg, PAD - 4, PAD, String(max), 'end');
}

function drawBars(svg, chart, stacked) {
  var max = maxValue(chart, stacked), left = 140;
  var names = chart.series.length ? chart.series[0].points.map(function (p) { return p.label; }) : [];
  var band = names.length ? (H - 2 * PAD) / names.length : 0;
  var height = stacked ? band : band / Math.max(chart.series.length, 1);
  var offsets = names.map(function () { return 0; });
  chart.series.forEach(function (s, si) {
    s.points.forEach(function (p, i) {
      var w = Math.max(p.value, 0) / max * (W - left - PAD);
      var y = PAD + i * band + (stacked ? 0 : si * height);
      var r = el('rect', {x: left + offsets[i], y: y, width: w, height: Math.max(height - 1, 1), fill: s.color}, svg);
      tooltip(r, p.label + ' / ' + s.name + ': ' + (p.actual !== undefined ? p.actual : p.value));
      if (stacked) { offsets[i] += w; }
    });
    label(svg, left + 4, 12 + 12 * si, s.name, 'start', s.color);
  });
  names.forEach(function (n, i) { label(svg, left - 4, PAD + i * band + band / 2 + 3, n, 'end'); });
}

function drawMap(svg, chart) {
  chart.series.forEach(function (s, si) {
    s.points.forEach(function (p) {
      var cx = (p.x + MERC_EXTENT) / (2 * MERC_EXTENT) * W;
      var cy = (MERC_EXTENT - p.y) / (2 * MERC_EXTENT) * H;
      var c = el('circle', {cx: cx, cy: cy, r: Math.max(p.size / 4, 2), fill: s.color, 'fill-opacity': 0.6}, svg);
      tooltip(c, p.label + ': ' + p.cases + ' cases, ' + p.deaths + ' deaths');
    });
    label(svg, 4, 12 + 12 * si, s.name, 'start', s.color);
  });
}

document.querySelectorAll('.board-chart').forEach(function (fig) {
  var chart = board.tabs[fig.getAttribute('data-tab')].charts[fig.getAttribute('data-chart')];
  var svg = el('svg', {viewBox: '0 0 ' + W + ' ' + H, width: W, height: H}, null);
  fig.insertBefore(svg, fig.firstChild);
  if (chart.kind === 'line') {
    drawLine(svg, chart);
  } else if (chart.kind === 'map') {
    drawMap(svg, chart);
  } else {
    drawBars(svg, chart, chart.kind === 'stacked_bar');
  }
  if (chart.x_label) { label(svg, W / 2, H - 6, chart.x_label, 'middle'); }
});

document.querySelectorAll('.board-tab').forEach(function (button) {
  button.addEventListener('click', function () {
    var idx = button.getAttribute('data-tab');
    document.querySelectorAll('.board-tab').forEach(function (b) { b.classList.toggle('active', b === button); });
    document.querySelectorAll('.board-panel').forEach(function (p) { p.hidden = p.id !== 'tab-' + idx; });
  });
});
";


/// Run the whole pipeline once and write the dashboard to the configured
/// output file. Returns the bytes written.
pub fn render_dashboard(cfg: &Config) -> Result<Bytes> {
	let pipeline = Pipeline::load(&cfg.sources, &cfg.epicenter)?;
	let html = Dashboard::build(&pipeline, &cfg.title, None).render_html()?;
	write_output(&cfg.output_file, &html)?;
	info!("wrote {} bytes to {}", html.len(), cfg.output_file.display());
	Ok(html)
}

/// Replace `path` in one rename, so concurrent renders never leave a mix
/// of two documents behind.
fn write_output(path: &Path, html: &[u8]) -> Result<()> {
	let dir = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};
	fs::create_dir_all(dir).map_err(|e| Error::output(dir, e))?;
	let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::output(dir, e))?;
	tmp.write_all(html).map_err(|e| Error::output(path, e))?;
	tmp.persist(path).map_err(|e| Error::output(path, e.error))?;
	Ok(())
}
