use serde::Serialize;

use smartstring::alias::{String as SmartString};

use chrono::NaiveDate;

use super::aggregate::{
	CaseBreakdown, CountBucket, FatalityRate, LocationAnalysis, LocationTotals,
	Metric, OutbreakRatio, RateBucket, Rollup, Scope, TimeAnalysis,
};
use super::geo::MapDataset;
use super::query::Query;
use super::records::LocationLevel;
use super::resample::Granularity;
use super::summary::{global_summary, location_summary, GlobalSummary, LocationSummary};


/// The four per-location tables of one level, optionally narrowed to one
/// location of that level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelViews {
	pub level: LocationLevel,
	pub totals: Vec<LocationTotals>,
	pub case_breakdown: Vec<CaseBreakdown>,
	pub outbreak_ratio: Vec<OutbreakRatio>,
	pub fatality_rate: Vec<FatalityRate>,
}

impl LevelViews {
	pub fn build(analysis: &LocationAnalysis, level: LocationLevel, value: Option<&str>) -> Self {
		Self{
			level,
			totals: analysis.totals(level, value),
			case_breakdown: analysis.case_breakdown(level, value),
			outbreak_ratio: analysis.outbreak_ratio(level, value),
			fatality_rate: analysis.fatality_rate(level, value),
		}
	}
}


/// All time series views at one granularity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeViews {
	pub granularity: Granularity,
	pub cases: Vec<Rollup>,
	pub deaths: Vec<Rollup>,
	pub fatality_rate: Vec<RateBucket>,
	pub infected_countries: Vec<CountBucket>,
}

impl TimeViews {
	pub fn build(analysis: &TimeAnalysis, granularity: Granularity, scope: Scope) -> Self {
		Self{
			granularity,
			cases: analysis.rollup(granularity, Metric::Cases, scope),
			deaths: analysis.rollup(granularity, Metric::Deaths, scope),
			fatality_rate: analysis.fatality_rate(granularity, scope),
			infected_countries: analysis.infected_countries(granularity, scope),
		}
	}
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldWideViews {
	pub as_of: NaiveDate,
	pub summary: GlobalSummary,
	pub map: MapDataset,
	pub region: LevelViews,
	pub continent: LevelViews,
	pub country: LevelViews,
	pub daily: TimeViews,
	pub monthly: TimeViews,
}

impl WorldWideViews {
	pub fn build(query: Query, as_of: NaiveDate, epicenter: &str) -> Self {
		let locations = LocationAnalysis::new(query, as_of, epicenter);
		let times = TimeAnalysis::new(query, as_of);
		Self{
			as_of,
			summary: global_summary(&query, as_of, epicenter),
			map: MapDataset::build(&query, as_of, None),
			region: LevelViews::build(&locations, LocationLevel::Region, None),
			continent: LevelViews::build(&locations, LocationLevel::Continent, None),
			country: LevelViews::build(&locations, LocationLevel::Country, None),
			daily: TimeViews::build(&times, Granularity::Daily, None),
			monthly: TimeViews::build(&times, Granularity::Monthly, None),
		}
	}

	pub fn level(&self, level: LocationLevel) -> &LevelViews {
		match level {
			LocationLevel::Region => &self.region,
			LocationLevel::Continent => &self.continent,
			LocationLevel::Country => &self.country,
		}
	}
}


/// Everything shown for a single location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationProfileViews {
	pub as_of: NaiveDate,
	pub level: LocationLevel,
	pub location: SmartString,
	pub summary: LocationSummary,
	pub map: MapDataset,
	pub tables: LevelViews,
	pub daily: TimeViews,
	pub monthly: TimeViews,
}

impl LocationProfileViews {
	pub fn build(query: Query, as_of: NaiveDate, epicenter: &str, level: LocationLevel, location: &str) -> Self {
		let locations = LocationAnalysis::new(query, as_of, epicenter);
		let times = TimeAnalysis::new(query, as_of);
		let scope = Some((level, location));
		Self{
			as_of,
			level,
			location: location.into(),
			summary: location_summary(&query, as_of, level, location),
			map: MapDataset::build(&query, as_of, scope),
			tables: LevelViews::build(&locations, level, Some(location)),
			daily: TimeViews::build(&times, Granularity::Daily, scope),
			monthly: TimeViews::build(&times, Granularity::Monthly, scope),
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use crate::densify::DenseTable;
	use crate::loader::tests::report;
	use crate::loader::RawData;
	use crate::records::LocationRow;

	fn day(d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(2020, 2, d).unwrap()
	}

	fn loc(country: &str, region: &str, continent: &str) -> LocationRow {
		LocationRow{country: country.into(), region: Some(region.into()), continent: Some(continent.into()), lat: 0.0, long: 0.0, merc_lat: 0.0, merc_long: 0.0}
	}

	fn fixture() -> (DenseTable, RawData) {
		let raw = RawData::from_tables(vec![
			report("China", day(1), 100, 3),
			report("China", day(2), 150, 5),
			report("Japan", day(2), 10, 0),
			report("Italy", day(2), 4, 1),
		], vec![
			loc("China", "Eastern Asia", "Asia"),
			loc("Japan", "Eastern Asia", "Asia"),
			loc("Italy", "Southern Europe", "Europe"),
		], Vec::new(), Vec::new()).unwrap();
		(DenseTable::build(&raw), raw)
	}

	#[test]
	fn world_wide_covers_every_level() {
		let (t, raw) = fixture();
		let q = Query::new(&t, &raw);
		let ww = WorldWideViews::build(q, day(2), "China");
		assert_eq!(ww.summary.cases_summary.total, 164);
		for level in LocationLevel::all().iter() {
			assert_eq!(ww.level(*level).level, *level);
			assert_eq!(ww.level(*level).totals.len(), 3);
		}
		assert_eq!(ww.country.case_breakdown.len(), 2);
		assert_eq!(ww.daily.cases.len(), 2);
		assert_eq!(ww.monthly.cases.len(), 1);
		assert_eq!(ww.monthly.cases[0].total, 164);
		assert_eq!(ww.map.len(), 3);
	}

	#[test]
	fn profile_is_restricted_to_the_location() {
		let (t, raw) = fixture();
		let q = Query::new(&t, &raw);
		let asia = LocationProfileViews::build(q, day(2), "China", LocationLevel::Continent, "Asia");
		assert_eq!(asia.summary.num_cases, 160);
		assert_eq!(asia.tables.totals.len(), 2);
		assert!(asia.tables.totals.iter().all(|r| r.location.as_ref().map(|v| v.as_str()) == Some("Asia")));
		assert_eq!(asia.map.len(), 2);
		assert_eq!(asia.daily.cases.last().unwrap().total, 160);

		let nowhere = LocationProfileViews::build(q, day(2), "China", LocationLevel::Continent, "Antarctica");
		assert_eq!(nowhere.summary.num_cases, 0);
		assert!(nowhere.tables.totals.is_empty());
		assert_eq!(nowhere.daily.cases.len(), 1);
		assert_eq!(nowhere.daily.cases[0].total, 0);
	}
}
