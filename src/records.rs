use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};

use smartstring::alias::{String as SmartString};

use enum_map::{Enum};

use chrono::naive::{NaiveDate, NaiveTime};


pub type Country = SmartString;


/// Column a location-scoped query matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum LocationLevel {
	Country,
	Region,
	Continent,
}

impl LocationLevel {
	pub fn all() -> [LocationLevel; 3] {
		[Self::Region, Self::Continent, Self::Country]
	}

	pub fn column(&self) -> &'static str {
		match self {
			Self::Country => "country",
			Self::Region => "region",
			Self::Continent => "continent",
		}
	}
}

impl fmt::Display for LocationLevel {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.column())
	}
}

#[derive(Debug, Clone)]
pub struct ParseLocationLevelError(String);

impl fmt::Display for ParseLocationLevelError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		write!(f, "unknown location level {:?}, expected country, region or continent", self.0)
	}
}

impl std::error::Error for ParseLocationLevelError {}

impl FromStr for LocationLevel {
	type Err = ParseLocationLevelError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"country" => Ok(Self::Country),
			"region" => Ok(Self::Region),
			"continent" => Ok(Self::Continent),
			_ => Err(ParseLocationLevelError(s.into())),
		}
	}
}


/// The three fixed scopes of the WHO risk assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum RiskScope {
	China,
	Globally,
	OutsideOfChina,
}

impl RiskScope {
	pub fn all() -> [RiskScope; 3] {
		[Self::China, Self::Globally, Self::OutsideOfChina]
	}

	pub fn key(&self) -> &'static str {
		match self {
			Self::China => "china",
			Self::Globally => "globally",
			Self::OutsideOfChina => "outside_of_china",
		}
	}

	pub fn from_key(s: &str) -> Option<Self> {
		match s.trim() {
			"china" => Some(Self::China),
			"globally" => Some(Self::Globally),
			"outside_of_china" => Some(Self::OutsideOfChina),
			_ => None,
		}
	}
}


static DATE_FORMATS: [&'static str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
static TIME_FORMATS: [&'static str; 2] = ["%H:%M:%S%.f", "%H:%M"];

/// A date, optionally followed by a time of day which is validated and
/// dropped. Formats are tried in order; month and day may be unpadded.
fn parse_flexible_date(s: &str) -> Option<NaiveDate> {
	let s = s.trim();
	let (date, time) = match s.find(|c: char| c == ' ' || c == 'T') {
		Some(idx) => (&s[..idx], Some(s[idx+1..].trim())),
		None => (s, None),
	};
	if let Some(time) = time {
		if !TIME_FORMATS.iter().any(|fmt| NaiveTime::parse_from_str(time, fmt).is_ok()) {
			return None
		}
	}
	DATE_FORMATS.iter().find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
}

fn spreadsheet_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
	where D: Deserializer<'de>
{
	let s = String::deserialize(deserializer)?;
	parse_flexible_date(&s).ok_or_else(|| de::Error::custom(format!("unrecognized date {:?}", s)))
}

/// Counters exported from spreadsheets come as `5`, `5.0` or an empty cell.
fn spreadsheet_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
	where D: Deserializer<'de>
{
	let s = String::deserialize(deserializer)?;
	let s = s.trim();
	if s.is_empty() {
		return Ok(0)
	}
	if let Ok(v) = s.parse::<u64>() {
		return Ok(v)
	}
	match s.parse::<f64>() {
		Ok(v) if v >= 0. && v.fract() == 0. => Ok(v as u64),
		_ => Err(de::Error::custom(format!("invalid count {:?}", s))),
	}
}

fn optional_name<'de, D>(deserializer: D) -> Result<Option<SmartString>, D::Error>
	where D: Deserializer<'de>
{
	let s = String::deserialize(deserializer)?;
	let s = s.trim();
	if s.is_empty() {
		Ok(None)
	} else {
		Ok(Some(s.into()))
	}
}


/// One row of the (sparse) case report log. All counters are cumulative.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportRecord {
	pub country: Country,
	#[serde(deserialize_with = "spreadsheet_date")]
	pub date: NaiveDate,
	#[serde(deserialize_with = "spreadsheet_count")]
	pub total_cases: u64,
	#[serde(default, deserialize_with = "spreadsheet_count")]
	pub total_deaths: u64,
	#[serde(default, rename = "total_cases_with_travel_history_to_china", alias = "total_cases_with_travel_history_to_origin", deserialize_with = "spreadsheet_count")]
	pub travel_history: u64,
	#[serde(default, rename = "total_cases_with_transmission_outside_china", alias = "total_cases_with_transmission_outside_origin", deserialize_with = "spreadsheet_count")]
	pub transmission_outside: u64,
	#[serde(default, rename = "total_cases_with_transmission_site_under_investigation", alias = "total_cases_with_transmission_under_investigation", deserialize_with = "spreadsheet_count")]
	pub under_investigation: u64,
}


#[derive(Debug, Clone, Deserialize)]
pub struct RawLocationRow {
	pub country: Country,
	#[serde(default, deserialize_with = "optional_name")]
	pub region: Option<SmartString>,
	#[serde(default, deserialize_with = "optional_name")]
	pub continent: Option<SmartString>,
	pub lat: f64,
	pub long: f64,
}

/// Coordinates row with its Web-Mercator projection, computed once at load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRow {
	pub country: Country,
	pub region: Option<SmartString>,
	pub continent: Option<SmartString>,
	pub lat: f64,
	pub long: f64,
	pub merc_lat: f64,
	pub merc_long: f64,
}

impl From<RawLocationRow> for LocationRow {
	fn from(raw: RawLocationRow) -> Self {
		let (merc_long, merc_lat) = super::geo::web_mercator(raw.lat, raw.long);
		Self{
			country: raw.country,
			region: raw.region,
			continent: raw.continent,
			lat: raw.lat,
			long: raw.long,
			merc_lat,
			merc_long,
		}
	}
}


#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RiskAssessmentRecord {
	pub location: SmartString,
	#[serde(alias = "risk_assesment")]
	pub risk_assessment: SmartString,
}


#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestingLabRecord {
	pub country: Country,
	#[serde(default, alias = "labs", alias = "laboratories", deserialize_with = "spreadsheet_count")]
	pub num_of_labs: u64,
}
