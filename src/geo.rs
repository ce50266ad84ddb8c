use std::collections::HashMap;
use std::f64::consts::PI;

use serde::Serialize;

use smartstring::alias::{String as SmartString};

use chrono::NaiveDate;

use super::aggregate::Scope;
use super::densify::DenseRow;
use super::query::Query;
use super::records::{Country, LocationLevel};


/// WGS84 semi-major axis, the sphere radius of EPSG:3857.
pub static EARTH_RADIUS: f64 = 6378137.0;

// EPSG:3857 is undefined at the poles; clamp to its usual latitude bound
static MAX_LATITUDE: f64 = 85.051_128_779_806_59;


/// Project WGS84 degrees to Web Mercator metres, returned as `(x, y)`.
pub fn web_mercator(lat: f64, long: f64) -> (f64, f64) {
	let lat = lat.max(-MAX_LATITUDE).min(MAX_LATITUDE);
	let x = EARTH_RADIUS * long.to_radians();
	let y = EARTH_RADIUS * (PI / 4. + lat.to_radians() / 2.).tan().ln();
	(x, y)
}


/// One marker on the map: a country's as-of totals at its projected position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
	pub country: Country,
	pub region: Option<SmartString>,
	pub continent: Option<SmartString>,
	pub lat: f64,
	pub long: f64,
	pub merc_lat: f64,
	pub merc_long: f64,
	pub date: NaiveDate,
	pub total_cases: u64,
	pub total_deaths: u64,
	pub travel_history: u64,
	pub transmission_outside: u64,
	pub under_investigation: u64,
	pub circle_size: f64,
}

/// Logarithmic marker size; zero when there are no cases.
pub fn circle_size(total_cases: u64) -> f64 {
	if total_cases == 0 {
		return 0.
	}
	(total_cases as f64 + 0.5).log10() * CIRCLE_SCALE
}

static CIRCLE_SCALE: f64 = 10.0;

fn in_scope(p: &MapPoint, scope: Scope) -> bool {
	let (level, value) = match scope {
		Some(s) => s,
		None => return true,
	};
	let v = match level {
		LocationLevel::Country => Some(p.country.as_str()),
		LocationLevel::Region => p.region.as_ref().map(|v| v.as_str()),
		LocationLevel::Continent => p.continent.as_ref().map(|v| v.as_str()),
	};
	v == Some(value)
}

/// Coordinates inner-joined with the as-of totals. Countries without
/// coordinates do not appear; the order is that of the coordinates table.
pub fn map_points(query: &Query, as_of: NaiveDate, scope: Scope) -> Vec<MapPoint> {
	let day: HashMap<&str, &DenseRow> = query.at_date(as_of)
		.into_iter()
		.map(|r| (r.country.as_str(), r))
		.collect();
	query.locations().iter().filter_map(|loc| {
		let r = day.get(loc.country.as_str())?;
		Some(MapPoint{
			country: loc.country.clone(),
			region: loc.region.clone(),
			continent: loc.continent.clone(),
			lat: loc.lat,
			long: loc.long,
			merc_lat: loc.merc_lat,
			merc_long: loc.merc_long,
			date: r.date,
			total_cases: r.total_cases,
			total_deaths: r.total_deaths,
			travel_history: r.travel_history,
			transmission_outside: r.transmission_outside,
			under_investigation: r.under_investigation,
			circle_size: circle_size(r.total_cases),
		})
	}).filter(|p| in_scope(p, scope)).collect()
}

/// Map markers split by whether the country has reported deaths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDataset {
	pub with_deaths: Vec<MapPoint>,
	pub without_deaths: Vec<MapPoint>,
}

impl MapDataset {
	pub fn build(query: &Query, as_of: NaiveDate, scope: Scope) -> Self {
		let (with_deaths, without_deaths) = map_points(query, as_of, scope)
			.into_iter()
			.partition(|p| p.total_deaths > 0);
		Self{with_deaths, without_deaths}
	}

	pub fn len(&self) -> usize {
		self.with_deaths.len() + self.without_deaths.len()
	}
}

/// Distinct continents on the map, in first-seen order.
pub fn continents(query: &Query, as_of: NaiveDate) -> Vec<SmartString> {
	let mut result: Vec<SmartString> = Vec::new();
	for p in map_points(query, as_of, None) {
		if let Some(c) = p.continent {
			if !result.contains(&c) {
				result.push(c);
			}
		}
	}
	result
}
