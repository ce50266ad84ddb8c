use chrono::NaiveDate;

use super::densify::{DenseRow, DenseTable};
use super::loader::RawData;
use super::records::{LocationLevel, LocationRow, RiskAssessmentRecord, TestingLabRecord};


/// Read-only row selection over the dense table and the auxiliary tables.
///
/// Nothing here computes; every accessor returns rows in table order.
#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
	table: &'a DenseTable,
	raw: &'a RawData,
}

impl<'a> Query<'a> {
	pub fn new(table: &'a DenseTable, raw: &'a RawData) -> Self {
		Self{table, raw}
	}

	pub fn table(&self) -> &'a DenseTable {
		self.table
	}

	pub fn rows(&self) -> &'a [DenseRow] {
		self.table.rows()
	}

	pub fn locations(&self) -> &'a [LocationRow] {
		&self.raw.locations[..]
	}

	pub fn at_date(&self, date: NaiveDate) -> Vec<&'a DenseRow> {
		self.table.day(date).iter().collect()
	}

	/// Everything from the start of the data set up to and including `date`.
	pub fn until_date(&self, date: NaiveDate) -> Vec<&'a DenseRow> {
		self.rows().iter().take_while(|r| r.date <= date).collect()
	}

	pub fn at_location(&self, level: LocationLevel, value: &str) -> Vec<&'a DenseRow> {
		self.rows().iter().filter(|r| r.location(level) == Some(value)).collect()
	}

	pub fn at_date_location(&self, date: NaiveDate, level: LocationLevel, value: &str) -> Vec<&'a DenseRow> {
		self.table.day(date).iter().filter(|r| r.location(level) == Some(value)).collect()
	}

	pub fn until_date_location(&self, date: NaiveDate, level: LocationLevel, value: &str) -> Vec<&'a DenseRow> {
		self.rows().iter()
			.take_while(|r| r.date <= date)
			.filter(|r| r.location(level) == Some(value))
			.collect()
	}

	/// Either the whole day or the part of it inside `scope`.
	pub fn at_date_scoped(&self, date: NaiveDate, scope: Option<(LocationLevel, &str)>) -> Vec<&'a DenseRow> {
		match scope {
			Some((level, value)) => self.at_date_location(date, level, value),
			None => self.at_date(date),
		}
	}

	pub fn until_date_scoped(&self, date: NaiveDate, scope: Option<(LocationLevel, &str)>) -> Vec<&'a DenseRow> {
		match scope {
			Some((level, value)) => self.until_date_location(date, level, value),
			None => self.until_date(date),
		}
	}

	/// The last `n` risk assessment rows; the source is ordered oldest first.
	pub fn latest_risk_assessments(&self, n: usize) -> &'a [RiskAssessmentRecord] {
		let all = &self.raw.risk_assessments[..];
		&all[all.len().saturating_sub(n)..]
	}

	pub fn labs_for_country(&self, country: &str) -> Vec<&'a TestingLabRecord> {
		self.raw.testing_laboratories.iter().filter(|r| r.country.as_str() == country).collect()
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use crate::loader::tests::report;

	fn day(d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
	}

	fn fixture() -> (DenseTable, RawData) {
		let locations = vec![
			LocationRow{country: "China".into(), region: Some("Eastern Asia".into()), continent: Some("Asia".into()), lat: 35.0, long: 103.0, merc_lat: 0.0, merc_long: 0.0},
			LocationRow{country: "Japan".into(), region: Some("Eastern Asia".into()), continent: Some("Asia".into()), lat: 36.0, long: 138.0, merc_lat: 0.0, merc_long: 0.0},
			LocationRow{country: "Italy".into(), region: Some("Southern Europe".into()), continent: Some("Europe".into()), lat: 41.0, long: 12.0, merc_lat: 0.0, merc_long: 0.0},
		];
		let risk = ["very high", "high", "moderate", "very high", "high", "high"].iter().zip(
			["china", "globally", "outside_of_china", "china", "globally", "outside_of_china"].iter()
		).map(|(r, l)| RiskAssessmentRecord{location: (*l).into(), risk_assessment: (*r).into()}).collect();
		let labs = vec![
			TestingLabRecord{country: "Italy".into(), num_of_labs: 4},
			TestingLabRecord{country: "Japan".into(), num_of_labs: 2},
		];
		let raw = RawData::from_tables(vec![
			report("China", day(1), 10, 1),
			report("China", day(3), 30, 2),
			report("Japan", day(2), 1, 0),
			report("Italy", day(3), 2, 0),
		], locations, risk, labs).unwrap();
		let table = DenseTable::build(&raw);
		(table, raw)
	}

	#[test]
	fn date_slices() {
		let (t, raw) = fixture();
		let q = Query::new(&t, &raw);
		assert_eq!(q.at_date(day(2)).len(), 3);
		assert!(q.at_date(day(2)).iter().all(|r| r.date == day(2)));
		assert_eq!(q.until_date(day(2)).len(), 6);
		assert!(q.until_date(day(2)).iter().all(|r| r.date <= day(2)));
		assert_eq!(q.until_date(day(9)).len(), 9);
	}

	#[test]
	fn location_slices() {
		let (t, raw) = fixture();
		let q = Query::new(&t, &raw);
		assert_eq!(q.at_location(LocationLevel::Region, "Eastern Asia").len(), 6);
		assert_eq!(q.at_location(LocationLevel::Country, "Italy").len(), 3);
		let asia = q.at_date_location(day(3), LocationLevel::Continent, "Asia");
		let countries: Vec<&str> = asia.iter().map(|r| r.country.as_str()).collect();
		assert_eq!(countries, vec!["China", "Japan"]);
		assert_eq!(q.until_date_location(day(2), LocationLevel::Continent, "Europe").len(), 2);
		assert!(q.at_location(LocationLevel::Continent, "Oceania").is_empty());
	}

	#[test]
	fn scoped_slices_fall_back_to_everything() {
		let (t, raw) = fixture();
		let q = Query::new(&t, &raw);
		assert_eq!(q.at_date_scoped(day(1), None).len(), 3);
		assert_eq!(q.at_date_scoped(day(1), Some((LocationLevel::Country, "China"))).len(), 1);
		assert_eq!(q.until_date_scoped(day(3), Some((LocationLevel::Country, "China"))).len(), 3);
	}

	#[test]
	fn latest_risk_assessments_are_the_tail() {
		let (t, raw) = fixture();
		let q = Query::new(&t, &raw);
		let latest = q.latest_risk_assessments(3);
		assert_eq!(latest.len(), 3);
		assert_eq!(latest[0].risk_assessment.as_str(), "very high");
		assert_eq!(q.latest_risk_assessments(10).len(), 6);
	}

	#[test]
	fn labs_by_country() {
		let (t, raw) = fixture();
		let q = Query::new(&t, &raw);
		assert_eq!(q.labs_for_country("Italy")[0].num_of_labs, 4);
		assert!(q.labs_for_country("China").is_empty());
	}
}
