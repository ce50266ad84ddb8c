use std::fs;

use chrono::NaiveDate;

use coronaboard::{
	Granularity, LocationLevel, Metric, Pipeline, TimeAnalysis, FirstReported, Error,
	Percentage,
};

mod common;


fn day(d: u32) -> NaiveDate {
	NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
}

fn load() -> (tempfile::TempDir, Pipeline) {
	let dir = tempfile::tempdir().unwrap();
	let paths = common::write_fixtures(dir.path());
	let pipeline = Pipeline::load(&paths, "China").unwrap();
	(dir, pipeline)
}

#[test]
fn daily_deltas_and_cumulative_rollup() {
	let (_dir, p) = load();
	let china: Vec<i64> = p.query()
		.at_location(LocationLevel::Country, "China")
		.iter()
		.map(|r| r.daily_cases)
		.collect();
	assert_eq!(china, vec![0, 0, 5, 0, 3]);

	let ta = TimeAnalysis::new(p.query(), day(5));
	let rollup = ta.rollup(Granularity::Daily, Metric::Cases, Some((LocationLevel::Country, "China")));
	assert_eq!(rollup.len(), 5);
	assert_eq!(rollup[4].total, 8);
}

#[test]
fn unmapped_country_counts_but_is_not_drawn() {
	let (_dir, p) = load();
	let summary = p.global_summary(None);
	assert_eq!(summary.cases_summary.total, 15);
	assert_eq!(summary.cases_summary.inside_epicenter, 8);
	assert_eq!(summary.location_summary.num_of_countries, 3);

	let ww = p.world_wide(None);
	let mapped: Vec<&str> = ww.map.with_deaths.iter()
		.chain(ww.map.without_deaths.iter())
		.map(|m| m.country.as_str())
		.collect();
	assert_eq!(mapped.len(), 2);
	assert!(!mapped.contains(&"Atlantis"));
	assert!(ww.country.totals.iter().any(|r| r.country.as_str() == "Atlantis"));
}

#[test]
fn early_as_of_date_is_not_registered_yet() {
	let (_dir, p) = load();
	let japan = p.location_summary(Some(day(3)), LocationLevel::Country, "Japan");
	assert_eq!(japan.first_reported_cases, FirstReported::NotRegisteredYet);
	assert_eq!(japan.first_reported_cases.to_string(), "not registered yet");
	let summary = p.global_summary(Some(day(3)));
	assert_eq!(summary.location_summary.num_of_countries, 1);
	let later = p.location_summary(None, LocationLevel::Country, "Japan");
	assert_eq!(later.first_reported_cases, FirstReported::On(day(4)));
}

#[test]
fn zero_cases_report_a_zero_fatality_rate() {
	let (_dir, p) = load();
	let summary = p.global_summary(Some(day(2)));
	assert_eq!(summary.cases_summary.total, 0);
	assert_eq!(summary.deaths_summary.fatality_rate, Percentage::zero());
	let china = p.location_summary(Some(day(2)), LocationLevel::Country, "China");
	assert_eq!(china.fatality_rate.value(), 0.);
}

#[test]
fn auxiliary_tables() {
	let (_dir, p) = load();
	let risk = p.global_summary(None).who_risk_assessment;
	assert_eq!(risk.globally.as_ref().map(|v| v.as_str()), Some("very high"));
	assert_eq!(p.query().labs_for_country("Japan")[0].num_of_labs, 12);
	assert_eq!(p.continents(None).len(), 1);
}

#[test]
fn rebuilding_is_idempotent() {
	let dir = tempfile::tempdir().unwrap();
	let paths = common::write_fixtures(dir.path());
	let a = Pipeline::load(&paths, "China").unwrap();
	let b = Pipeline::load(&paths, "China").unwrap();
	assert_eq!(a.world_wide(None), b.world_wide(None));
	assert_eq!(a.table().rows(), b.table().rows());
}

#[test]
fn malformed_count_is_a_load_error() {
	let dir = tempfile::tempdir().unwrap();
	let paths = common::write_fixtures(dir.path());
	fs::write(&paths.reports, "country,date,total_cases,total_deaths\nChina,2020-01-01,lots,0\n").unwrap();
	match Pipeline::load(&paths, "China") {
		Err(e @ Error::Csv{..}) => assert!(e.is_load_error()),
		other => panic!("expected a csv error, got {:?}", other.map(|_| ())),
	}
}

#[test]
fn header_only_report_table_is_empty() {
	let dir = tempfile::tempdir().unwrap();
	let paths = common::write_fixtures(dir.path());
	fs::write(&paths.reports, "country,date,total_cases,total_deaths\n").unwrap();
	match Pipeline::load(&paths, "China") {
		Err(Error::EmptyDataset) => (),
		other => panic!("expected an empty data set, got {:?}", other.map(|_| ())),
	}
}
