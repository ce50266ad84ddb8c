use std::collections::HashSet;
use std::fmt;

use log::warn;

use serde::{Serialize, Serializer};

use smartstring::alias::{String as SmartString};

use enum_map::EnumMap;

use chrono::NaiveDate;

use super::densify::DenseRow;
use super::query::Query;
use super::rate::Percentage;
use super::records::{LocationLevel, RiskScope};


/// Text shown in place of a date for locations without any case or death.
pub static NOT_REGISTERED_YET: &'static str = "not registered yet";


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstReported {
	On(NaiveDate),
	NotRegisteredYet,
}

impl FirstReported {
	fn scan<'x, I: IntoIterator<Item = &'x DenseRow>, F: Fn(&DenseRow) -> u64>(rows: I, f: F) -> Self {
		for row in rows {
			if f(row) > 0 {
				return Self::On(row.date)
			}
		}
		Self::NotRegisteredYet
	}
}

impl fmt::Display for FirstReported {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::On(date) => fmt::Display::fmt(date, f),
			Self::NotRegisteredYet => f.write_str(NOT_REGISTERED_YET),
		}
	}
}

impl Serialize for FirstReported {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSummary {
	pub from: NaiveDate,
	pub to: NaiveDate,
	pub num_of_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCounts {
	pub num_of_countries: usize,
	pub num_of_regions: usize,
	pub num_of_continents: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CasesSummary {
	pub inside_epicenter: u64,
	pub outside_epicenter: u64,
	pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeathsSummary {
	pub inside_epicenter: u64,
	pub outside_epicenter: u64,
	pub total: u64,
	pub fatality_rate: Percentage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskSummary {
	pub china: Option<SmartString>,
	pub globally: Option<SmartString>,
	pub outside_of_china: Option<SmartString>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalSummary {
	pub epicenter: SmartString,
	pub date_summary: DateSummary,
	pub location_summary: LocationCounts,
	pub cases_summary: CasesSummary,
	pub deaths_summary: DeathsSummary,
	pub who_risk_assessment: RiskSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
	pub selected_level: LocationLevel,
	pub location_name: SmartString,
	pub from_date: NaiveDate,
	pub to_date: NaiveDate,
	pub num_cases: u64,
	pub num_deaths: u64,
	pub fatality_rate: Percentage,
	pub first_reported_cases: FirstReported,
	pub first_reported_deaths: FirstReported,
}


/// Headline fatality percentage. A zero denominator has no defined rate;
/// it is reported as zero, but loudly.
fn headline_fatality(deaths: u64, cases: u64) -> Percentage {
	match Percentage::checked(deaths as i64, cases as i64) {
		Ok(v) => v,
		Err(e) => {
			warn!("{}, reporting a fatality rate of 0", e);
			Percentage::zero()
		},
	}
}

fn nonzero_distinct<'x, I: Iterator<Item = &'x DenseRow>>(rows: I, level: LocationLevel) -> usize {
	rows.filter(|r| r.total_cases != 0)
		.filter_map(|r| r.location(level))
		.collect::<HashSet<&str>>()
		.len()
}

fn latest_risk(query: &Query) -> RiskSummary {
	let mut levels: EnumMap<RiskScope, Option<SmartString>> = EnumMap::default();
	for rec in query.latest_risk_assessments(RiskScope::all().len()) {
		match RiskScope::from_key(&rec.location) {
			Some(scope) => levels[scope] = Some(rec.risk_assessment.clone()),
			None => warn!("ignoring risk assessment for unknown scope {:?}", rec.location),
		}
	}
	RiskSummary{
		china: levels[RiskScope::China].clone(),
		globally: levels[RiskScope::Globally].clone(),
		outside_of_china: levels[RiskScope::OutsideOfChina].clone(),
	}
}


pub fn global_summary(query: &Query, as_of: NaiveDate, epicenter: &str) -> GlobalSummary {
	let from = query.table().start();
	let day = query.at_date(as_of);

	let epicenter_row = day.iter().find(|r| r.country.as_str() == epicenter);
	let (cases_inside, deaths_inside) = match epicenter_row {
		Some(r) => (r.total_cases, r.total_deaths),
		None => {
			warn!("epicenter {:?} has no row on {}", epicenter, as_of);
			(0, 0)
		},
	};
	let total_cases: u64 = day.iter().map(|r| r.total_cases).sum();
	let total_deaths: u64 = day.iter().map(|r| r.total_deaths).sum();

	GlobalSummary{
		epicenter: epicenter.into(),
		date_summary: DateSummary{
			from,
			to: as_of,
			num_of_days: (as_of - from).num_days(),
		},
		location_summary: LocationCounts{
			num_of_countries: nonzero_distinct(day.iter().copied(), LocationLevel::Country),
			num_of_regions: nonzero_distinct(day.iter().copied(), LocationLevel::Region),
			num_of_continents: nonzero_distinct(day.iter().copied(), LocationLevel::Continent),
		},
		cases_summary: CasesSummary{
			inside_epicenter: cases_inside,
			outside_epicenter: total_cases - cases_inside,
			total: total_cases,
		},
		deaths_summary: DeathsSummary{
			inside_epicenter: deaths_inside,
			outside_epicenter: total_deaths - deaths_inside,
			total: total_deaths,
			fatality_rate: headline_fatality(total_deaths, total_cases),
		},
		who_risk_assessment: latest_risk(query),
	}
}


pub fn location_summary(query: &Query, as_of: NaiveDate, level: LocationLevel, location: &str) -> LocationSummary {
	let day = query.at_date_location(as_of, level, location);
	let num_cases: u64 = day.iter().map(|r| r.total_cases).sum();
	let num_deaths: u64 = day.iter().map(|r| r.total_deaths).sum();

	let history = query.until_date_location(as_of, level, location);
	LocationSummary{
		selected_level: level,
		location_name: location.into(),
		from_date: query.table().start(),
		to_date: as_of,
		num_cases,
		num_deaths,
		fatality_rate: headline_fatality(num_deaths, num_cases),
		first_reported_cases: FirstReported::scan(history.iter().copied(), |r| r.total_cases),
		first_reported_deaths: FirstReported::scan(history.iter().copied(), |r| r.total_deaths),
	}
}
