use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use log::trace;

use serde::Serialize;

use smartstring::alias::{String as SmartString};

use chrono::NaiveDate;

use super::densify::DenseRow;
use super::query::Query;
use super::rate::Percentage;
use super::records::{Country, LocationLevel};
use super::resample::{resample, Granularity};


/// Optional restriction of a view to one location.
pub type Scope<'s> = Option<(LocationLevel, &'s str)>;


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationTotals {
	pub location: Option<SmartString>,
	pub country: Country,
	pub total_cases: u64,
	pub total_deaths: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseBreakdown {
	pub location: Option<SmartString>,
	pub country: Country,
	pub travel_history: u64,
	pub transmission_outside: u64,
	pub under_investigation: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutbreakRatio {
	pub location: Option<SmartString>,
	pub country: Country,
	pub total_cases: u64,
	pub outbreak_ratio: Percentage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FatalityRate {
	pub location: Option<SmartString>,
	pub country: Country,
	pub fatality_rate: Percentage,
}

/// Fatality rate and outbreak ratio side by side, per country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRates {
	pub location: Option<SmartString>,
	pub country: Country,
	pub fatality_rate: Percentage,
	pub total_cases: u64,
	pub outbreak_ratio: Percentage,
}


fn owned_location(row: &DenseRow, level: LocationLevel) -> Option<SmartString> {
	row.location(level).map(SmartString::from)
}

fn by_f64(a: f64, b: f64) -> Ordering {
	a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}


/// Per-location tables as of a fixed date.
#[derive(Debug, Clone, Copy)]
pub struct LocationAnalysis<'a> {
	query: Query<'a>,
	as_of: NaiveDate,
	epicenter: &'a str,
}

impl<'a> LocationAnalysis<'a> {
	pub fn new(query: Query<'a>, as_of: NaiveDate, epicenter: &'a str) -> Self {
		Self{query, as_of, epicenter}
	}

	pub fn as_of(&self) -> NaiveDate {
		self.as_of
	}

	fn slice(&self, level: LocationLevel, value: Option<&str>) -> Vec<&'a DenseRow> {
		self.query.at_date_scoped(self.as_of, value.map(|v| (level, v)))
	}

	/// Cumulative cases and deaths, ascending by cases.
	pub fn totals(&self, level: LocationLevel, value: Option<&str>) -> Vec<LocationTotals> {
		let mut rows = self.slice(level, value);
		rows.sort_by_key(|r| r.total_cases);
		rows.into_iter().map(|r| LocationTotals{
			location: owned_location(r, level),
			country: r.country.clone(),
			total_cases: r.total_cases,
			total_deaths: r.total_deaths,
		}).collect()
	}

	/// Transmission breakdown, ascending by cases. At country level the
	/// epicenter is left out, its numbers would flatten everyone else.
	pub fn case_breakdown(&self, level: LocationLevel, value: Option<&str>) -> Vec<CaseBreakdown> {
		let mut rows = self.slice(level, value);
		if level == LocationLevel::Country {
			rows.retain(|r| r.country.as_str() != self.epicenter);
		}
		rows.sort_by_key(|r| r.total_cases);
		rows.into_iter().map(|r| CaseBreakdown{
			location: owned_location(r, level),
			country: r.country.clone(),
			travel_history: r.travel_history,
			transmission_outside: r.transmission_outside,
			under_investigation: r.under_investigation,
		}).collect()
	}

	/// Share of cases transmitted outside the epicenter, ascending.
	pub fn outbreak_ratio(&self, level: LocationLevel, value: Option<&str>) -> Vec<OutbreakRatio> {
		let mut result: Vec<OutbreakRatio> = self.slice(level, value).into_iter().map(|r| OutbreakRatio{
			location: owned_location(r, level),
			country: r.country.clone(),
			total_cases: r.total_cases,
			outbreak_ratio: Percentage::or_zero(r.transmission_outside as i64, r.total_cases as i64),
		}).collect();
		result.sort_by(|a, b| by_f64(a.outbreak_ratio.value(), b.outbreak_ratio.value()));
		result
	}

	/// Deaths over cases, ascending.
	pub fn fatality_rate(&self, level: LocationLevel, value: Option<&str>) -> Vec<FatalityRate> {
		let mut result: Vec<FatalityRate> = self.slice(level, value).into_iter().map(|r| FatalityRate{
			location: owned_location(r, level),
			country: r.country.clone(),
			fatality_rate: Percentage::or_zero(r.total_deaths as i64, r.total_cases as i64),
		}).collect();
		result.sort_by(|a, b| by_f64(a.fatality_rate.value(), b.fatality_rate.value()));
		result
	}

	/// Fatality rates joined with outbreak ratios on the country, in
	/// fatality-rate order.
	pub fn combined(&self, level: LocationLevel) -> Vec<LocationRates> {
		let outbreak: HashMap<Country, OutbreakRatio> = self.outbreak_ratio(level, None)
			.into_iter()
			.map(|r| (r.country.clone(), r))
			.collect();
		self.fatality_rate(level, None).into_iter().filter_map(|f| {
			let o = outbreak.get(&f.country)?;
			Some(LocationRates{
				location: f.location,
				country: f.country,
				fatality_rate: f.fatality_rate,
				total_cases: o.total_cases,
				outbreak_ratio: o.outbreak_ratio,
			})
		}).collect()
	}
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
	Cases,
	Deaths,
}

impl Metric {
	fn daily(&self, row: &DenseRow) -> i64 {
		match self {
			Self::Cases => row.daily_cases,
			Self::Deaths => row.daily_deaths,
		}
	}
}


/// One bucket of a rollup: the bucket's own sum and the running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rollup {
	pub date: NaiveDate,
	pub period: i64,
	pub total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateBucket {
	pub date: NaiveDate,
	pub fatality_rate: Percentage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountBucket {
	pub date: NaiveDate,
	pub countries: usize,
}


#[derive(Default)]
struct CaseDeathSums {
	cases: i64,
	deaths: i64,
}


/// Time series views from the start of the data set up to a fixed date.
///
/// Views over an empty selection come back as a single zero bucket at the
/// as-of date so that charts always get a well-formed series.
#[derive(Debug, Clone, Copy)]
pub struct TimeAnalysis<'a> {
	query: Query<'a>,
	as_of: NaiveDate,
}

impl<'a> TimeAnalysis<'a> {
	pub fn new(query: Query<'a>, as_of: NaiveDate) -> Self {
		Self{query, as_of}
	}

	pub fn as_of(&self) -> NaiveDate {
		self.as_of
	}

	fn rows(&self, scope: Scope) -> Vec<&'a DenseRow> {
		self.query.until_date_scoped(self.as_of, scope)
	}

	pub fn rollup(&self, granularity: Granularity, metric: Metric, scope: Scope) -> Vec<Rollup> {
		let buckets = resample(self.rows(scope), granularity, |acc: &mut i64, r| *acc += metric.daily(r));
		let mut total = 0;
		let mut result: Vec<Rollup> = buckets.into_iter().map(|(date, period)| {
			total += period;
			Rollup{date, period, total}
		}).collect();
		if result.is_empty() {
			trace!("empty {} {:?} rollup for {:?}", granularity, metric, scope);
			result.push(Rollup{date: granularity.bucket(self.as_of), period: 0, total: 0});
		}
		result
	}

	pub fn fatality_rate(&self, granularity: Granularity, scope: Scope) -> Vec<RateBucket> {
		let buckets = resample(self.rows(scope), granularity, |acc: &mut CaseDeathSums, r| {
			acc.cases += r.daily_cases;
			acc.deaths += r.daily_deaths;
		});
		let mut result: Vec<RateBucket> = buckets.into_iter().map(|(date, sums)| RateBucket{
			date,
			fatality_rate: Percentage::or_zero(sums.deaths, sums.cases),
		}).collect();
		if result.is_empty() {
			result.push(RateBucket{date: granularity.bucket(self.as_of), fatality_rate: Percentage::zero()});
		}
		result
	}

	/// Distinct countries with a nonzero cumulative case count in each bucket.
	pub fn infected_countries(&self, granularity: Granularity, scope: Scope) -> Vec<CountBucket> {
		let buckets = resample(self.rows(scope), granularity, |acc: &mut HashSet<Country>, r| {
			if r.total_cases != 0 {
				acc.insert(r.country.clone());
			}
		});
		let mut result: Vec<CountBucket> = buckets.into_iter().map(|(date, countries)| CountBucket{
			date,
			countries: countries.len(),
		}).collect();
		if result.is_empty() {
			result.push(CountBucket{date: granularity.bucket(self.as_of), countries: 0});
		}
		result
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use crate::densify::DenseTable;
	use crate::loader::tests::report;
	use crate::loader::RawData;
	use crate::records::{LocationRow, ReportRecord};

	fn day(m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(2020, m, d).unwrap()
	}

	fn loc(country: &str, region: &str, continent: &str) -> LocationRow {
		LocationRow{country: country.into(), region: Some(region.into()), continent: Some(continent.into()), lat: 0.0, long: 0.0, merc_lat: 0.0, merc_long: 0.0}
	}

	fn breakdown(mut rec: ReportRecord, travel: u64, outside: u64, investigation: u64) -> ReportRecord {
		rec.travel_history = travel;
		rec.transmission_outside = outside;
		rec.under_investigation = investigation;
		rec
	}

	fn fixture() -> (DenseTable, RawData) {
		let raw = RawData::from_tables(vec![
			breakdown(report("China", day(1, 30), 100, 2), 0, 0, 0),
			breakdown(report("China", day(2, 2), 300, 9), 0, 0, 0),
			breakdown(report("Japan", day(1, 31), 4, 0), 4, 0, 0),
			breakdown(report("Japan", day(2, 2), 20, 1), 10, 8, 2),
			breakdown(report("Italy", day(2, 1), 2, 0), 1, 1, 0),
			breakdown(report("Italy", day(2, 2), 3, 0), 1, 2, 0),
			report("Atlantis", day(2, 1), 0, 0),
		], vec![
			loc("China", "Eastern Asia", "Asia"),
			loc("Japan", "Eastern Asia", "Asia"),
			loc("Italy", "Southern Europe", "Europe"),
			loc("Atlantis", "Nowhere", "Ocean"),
		], Vec::new(), Vec::new()).unwrap();
		(DenseTable::build(&raw), raw)
	}

	#[test]
	fn totals_ascend_by_cases() {
		let (t, raw) = fixture();
		let la = LocationAnalysis::new(Query::new(&t, &raw), day(2, 2), "China");
		let totals = la.totals(LocationLevel::Region, None);
		let order: Vec<&str> = totals.iter().map(|r| r.country.as_str()).collect();
		assert_eq!(order, vec!["Atlantis", "Italy", "Japan", "China"]);
		assert_eq!(totals[3].location.as_ref().map(|v| v.as_str()), Some("Eastern Asia"));
		let asia = la.totals(LocationLevel::Continent, Some("Asia"));
		assert_eq!(asia.len(), 2);
		assert_eq!(asia[1].total_cases, 300);
	}

	#[test]
	fn breakdown_leaves_out_the_epicenter_at_country_level() {
		let (t, raw) = fixture();
		let la = LocationAnalysis::new(Query::new(&t, &raw), day(2, 2), "China");
		let by_country = la.case_breakdown(LocationLevel::Country, None);
		assert!(by_country.iter().all(|r| r.country.as_str() != "China"));
		assert_eq!(by_country.len(), 3);
		let by_region = la.case_breakdown(LocationLevel::Region, None);
		assert!(by_region.iter().any(|r| r.country.as_str() == "China"));
		let japan = by_country.iter().find(|r| r.country.as_str() == "Japan").unwrap();
		assert_eq!((japan.travel_history, japan.transmission_outside, japan.under_investigation), (10, 8, 2));
	}

	#[test]
	fn ratios_are_rounded_and_zero_safe() {
		let (t, raw) = fixture();
		let la = LocationAnalysis::new(Query::new(&t, &raw), day(2, 2), "China");
		let outbreak = la.outbreak_ratio(LocationLevel::Country, None);
		let italy = outbreak.iter().find(|r| r.country.as_str() == "Italy").unwrap();
		assert_eq!(italy.outbreak_ratio.value(), 66.67);
		let atlantis = outbreak.iter().find(|r| r.country.as_str() == "Atlantis").unwrap();
		assert_eq!(atlantis.outbreak_ratio, Percentage::zero());
		for w in outbreak.windows(2) {
			assert!(w[0].outbreak_ratio <= w[1].outbreak_ratio);
		}

		let fatality = la.fatality_rate(LocationLevel::Country, None);
		let china = fatality.iter().find(|r| r.country.as_str() == "China").unwrap();
		assert_eq!(china.fatality_rate.value(), 3.0);
		let japan = fatality.iter().find(|r| r.country.as_str() == "Japan").unwrap();
		assert_eq!(japan.fatality_rate.value(), 5.0);
		for r in fatality.iter() {
			assert!(r.fatality_rate.value() >= 0. && r.fatality_rate.value() <= 100.);
		}
	}

	#[test]
	fn combined_view_joins_on_country() {
		let (t, raw) = fixture();
		let la = LocationAnalysis::new(Query::new(&t, &raw), day(2, 2), "China");
		let combined = la.combined(LocationLevel::Country);
		assert_eq!(combined.len(), 4);
		let japan = combined.iter().find(|r| r.country.as_str() == "Japan").unwrap();
		assert_eq!(japan.total_cases, 20);
		assert_eq!(japan.outbreak_ratio.value(), 40.0);
		assert_eq!(japan.fatality_rate.value(), 5.0);
	}

	#[test]
	fn rollups_accumulate_bucket_sums() {
		let (t, raw) = fixture();
		let ta = TimeAnalysis::new(Query::new(&t, &raw), day(2, 2));
		let daily = ta.rollup(Granularity::Daily, Metric::Cases, None);
		assert_eq!(daily.len(), 4);
		assert_eq!(daily[0], Rollup{date: day(1, 30), period: 100, total: 100});
		for w in daily.windows(2) {
			assert_eq!(w[1].total, w[0].total + w[1].period);
		}
		// cumulative grand total matches the as-of day, despite the zero-filled gap in China
		let last_day_sum: i64 = Query::new(&t, &raw).at_date(day(2, 2)).iter().map(|r| r.total_cases as i64).sum();
		assert_eq!(daily.last().unwrap().total, last_day_sum);

		let monthly = ta.rollup(Granularity::Monthly, Metric::Deaths, Some((LocationLevel::Country, "China")));
		assert_eq!(monthly.len(), 2);
		assert_eq!(monthly[0].date, day(1, 31));
		assert_eq!(monthly[1].date, day(2, 29));
		assert_eq!(monthly[1].total, 9);
	}

	#[test]
	fn empty_scope_yields_single_zero_bucket() {
		let (t, raw) = fixture();
		let ta = TimeAnalysis::new(Query::new(&t, &raw), day(2, 2));
		let scope = Some((LocationLevel::Continent, "Antarctica"));
		assert_eq!(ta.rollup(Granularity::Daily, Metric::Cases, scope), vec![Rollup{date: day(2, 2), period: 0, total: 0}]);
		assert_eq!(ta.fatality_rate(Granularity::Monthly, scope), vec![RateBucket{date: day(2, 29), fatality_rate: Percentage::zero()}]);
		assert_eq!(ta.infected_countries(Granularity::Daily, scope), vec![CountBucket{date: day(2, 2), countries: 0}]);
	}

	#[test]
	fn fatality_rate_per_bucket() {
		let (t, raw) = fixture();
		let ta = TimeAnalysis::new(Query::new(&t, &raw), day(2, 2));
		let rates = ta.fatality_rate(Granularity::Daily, Some((LocationLevel::Country, "Japan")));
		// Jan 30: no cases yet; Feb 2 follows an unreported (zero) day: 20 new cases, 1 new death
		assert_eq!(rates[0].fatality_rate, Percentage::zero());
		assert_eq!(rates[3].fatality_rate.value(), 5.0);
	}

	#[test]
	fn infected_countries_over_time() {
		let (t, raw) = fixture();
		let ta = TimeAnalysis::new(Query::new(&t, &raw), day(2, 2));
		let counts: Vec<usize> = ta.infected_countries(Granularity::Daily, None).iter().map(|b| b.countries).collect();
		// China's Jan 31 and Feb 1 are unreported and therefore zero
		assert_eq!(counts, vec![1, 1, 1, 3]);
		let monthly: Vec<usize> = ta.infected_countries(Granularity::Monthly, None).iter().map(|b| b.countries).collect();
		assert_eq!(monthly, vec![2, 3]);
	}
}
