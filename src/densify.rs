use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use serde::Serialize;

use smartstring::alias::{String as SmartString};

use chrono::NaiveDate;

use super::loader::RawData;
use super::records::{Country, LocationLevel, LocationRow, ReportRecord};
use super::timeseries::{Counters, Diff};


/// One (country, day) cell of the dense table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DenseRow {
	pub country: Country,
	pub date: NaiveDate,
	pub total_cases: u64,
	pub total_deaths: u64,
	pub travel_history: u64,
	pub transmission_outside: u64,
	pub under_investigation: u64,
	pub daily_cases: i64,
	pub daily_deaths: i64,
	pub region: Option<SmartString>,
	pub continent: Option<SmartString>,
	pub lat: Option<f64>,
	pub long: Option<f64>,
}

impl DenseRow {
	/// Value of the location column selected by `level`; `None` if the
	/// country had no geography to join.
	pub fn location(&self, level: LocationLevel) -> Option<&str> {
		match level {
			LocationLevel::Country => Some(self.country.as_str()),
			LocationLevel::Region => self.region.as_ref().map(|v| v.as_str()),
			LocationLevel::Continent => self.continent.as_ref().map(|v| v.as_str()),
		}
	}
}


struct CumulativeGrid {
	cases: Counters<Country>,
	deaths: Counters<Country>,
	travel_history: Counters<Country>,
	transmission_outside: Counters<Country>,
	under_investigation: Counters<Country>,
}

impl CumulativeGrid {
	fn new(start: NaiveDate, end: NaiveDate, countries: &[Country]) -> Self {
		let mut result = Self{
			cases: Counters::new(start, end),
			deaths: Counters::new(start, end),
			travel_history: Counters::new(start, end),
			transmission_outside: Counters::new(start, end),
			under_investigation: Counters::new(start, end),
		};
		// every country gets a full zero row, even if it only reports once
		for country in countries {
			result.cases.get_or_create(country.clone());
			result.deaths.get_or_create(country.clone());
			result.travel_history.get_or_create(country.clone());
			result.transmission_outside.get_or_create(country.clone());
			result.under_investigation.get_or_create(country.clone());
		}
		result
	}

	fn submit(&mut self, rec: &ReportRecord) {
		// the grid spans every report date
		let index = match self.cases.date_index(rec.date) {
			Some(i) => i,
			None => return,
		};
		let k = rec.country.clone();
		self.cases.get_or_create(k.clone())[index] = rec.total_cases;
		self.deaths.get_or_create(k.clone())[index] = rec.total_deaths;
		self.travel_history.get_or_create(k.clone())[index] = rec.travel_history;
		self.transmission_outside.get_or_create(k.clone())[index] = rec.transmission_outside;
		self.under_investigation.get_or_create(k)[index] = rec.under_investigation;
	}
}


/// The report log expanded to exactly one row per country per calendar day.
///
/// Rows are ordered by date, then by country name.
#[derive(Debug, Clone)]
pub struct DenseTable {
	start: NaiveDate,
	end: NaiveDate,
	countries: Vec<Country>,
	rows: Vec<DenseRow>,
}

impl DenseTable {
	pub fn build(raw: &RawData) -> Self {
		let (start, end) = raw.date_range();
		let countries = raw.list_countries();

		let mut grid = CumulativeGrid::new(start, end, &countries);
		let mut seen: HashSet<(&str, NaiveDate)> = HashSet::with_capacity(raw.reports.len());
		for rec in raw.reports.iter() {
			if !seen.insert((rec.country.as_str(), rec.date)) {
				warn!("duplicate report for {} on {}, keeping the later row", rec.country, rec.date);
			}
			grid.submit(rec);
		}

		let daily_cases: Diff<Country> = grid.cases.deltas();
		let daily_deaths: Diff<Country> = grid.deaths.deltas();

		let mut geography: HashMap<&str, &LocationRow> = HashMap::with_capacity(raw.locations.len());
		for loc in raw.locations.iter() {
			geography.entry(loc.country.as_str()).or_insert(loc);
		}
		for country in countries.iter() {
			if !geography.contains_key(country.as_str()) {
				debug!("no geography for {}, location fields stay empty", country);
			}
		}

		let ndays = grid.cases.len();
		let mut rows = Vec::with_capacity(ndays * countries.len());
		for (i, date) in start.iter_days().take(ndays).enumerate() {
			for country in countries.iter() {
				let geo = geography.get(country.as_str());
				let cell = |ts: &Counters<Country>| ts.get_value(country, i).unwrap_or(0);
				rows.push(DenseRow{
					country: country.clone(),
					date,
					total_cases: cell(&grid.cases),
					total_deaths: cell(&grid.deaths),
					travel_history: cell(&grid.travel_history),
					transmission_outside: cell(&grid.transmission_outside),
					under_investigation: cell(&grid.under_investigation),
					daily_cases: daily_cases.get_value(country, i).unwrap_or(0),
					daily_deaths: daily_deaths.get_value(country, i).unwrap_or(0),
					region: geo.and_then(|g| g.region.clone()),
					continent: geo.and_then(|g| g.continent.clone()),
					lat: geo.map(|g| g.lat),
					long: geo.map(|g| g.long),
				});
			}
		}
		debug!("densified {} countries over {} days into {} rows", countries.len(), ndays, rows.len());

		Self{
			start,
			end,
			countries,
			rows,
		}
	}

	pub fn start(&self) -> NaiveDate {
		self.start
	}

	pub fn end(&self) -> NaiveDate {
		self.end
	}

	pub fn countries(&self) -> &[Country] {
		&self.countries[..]
	}

	pub fn rows(&self) -> &[DenseRow] {
		&self.rows[..]
	}

	/// All rows of a single day, in country order.
	pub fn day(&self, date: NaiveDate) -> &[DenseRow] {
		let days = (date - self.start).num_days();
		if days < 0 || date > self.end {
			return &[]
		}
		let n = self.countries.len();
		let offset = days as usize * n;
		&self.rows[offset..offset + n]
	}
}
