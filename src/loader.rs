use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::{debug, info};

use chrono::NaiveDate;

use super::error::{Error, Result};
use super::ioutil::read_table;
use super::records::{Country, LocationRow, RawLocationRow, ReportRecord, RiskAssessmentRecord, TestingLabRecord};


/// Locations of the four source tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
	pub reports: PathBuf,
	pub coordinates: PathBuf,
	pub risk_assessment: PathBuf,
	pub testing_laboratories: PathBuf,
}

impl SourcePaths {
	/// The file names used by the published data set, relative to `dir`.
	pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
		let dir = dir.as_ref();
		Self{
			reports: dir.join("corona_report.csv"),
			coordinates: dir.join("coordinates.csv"),
			risk_assessment: dir.join("risk_assessment.csv"),
			testing_laboratories: dir.join("testing_laboratories.csv"),
		}
	}
}


/// In-memory copies of the source tables, as read from disk.
#[derive(Debug, Clone)]
pub struct RawData {
	pub reports: Vec<ReportRecord>,
	pub locations: Vec<LocationRow>,
	pub risk_assessments: Vec<RiskAssessmentRecord>,
	pub testing_laboratories: Vec<TestingLabRecord>,
}

impl RawData {
	pub fn load(paths: &SourcePaths) -> Result<Self> {
		let reports: Vec<ReportRecord> = read_table(&paths.reports)?;
		if reports.is_empty() {
			return Err(Error::EmptyDataset)
		}
		let locations: Vec<RawLocationRow> = read_table(&paths.coordinates)?;
		let risk_assessments = read_table(&paths.risk_assessment)?;
		let testing_laboratories = read_table(&paths.testing_laboratories)?;
		let data = Self::from_tables(
			reports,
			locations.into_iter().map(LocationRow::from).collect(),
			risk_assessments,
			testing_laboratories,
		)?;
		info!(
			"loaded {} reports, {} locations, {} risk assessments, {} lab rows",
			data.reports.len(),
			data.locations.len(),
			data.risk_assessments.len(),
			data.testing_laboratories.len(),
		);
		Ok(data)
	}

	pub fn from_tables(
			reports: Vec<ReportRecord>,
			locations: Vec<LocationRow>,
			risk_assessments: Vec<RiskAssessmentRecord>,
			testing_laboratories: Vec<TestingLabRecord>,
	) -> Result<Self> {
		if reports.is_empty() {
			return Err(Error::EmptyDataset)
		}
		Ok(Self{
			reports,
			locations,
			risk_assessments,
			testing_laboratories,
		})
	}

	/// Rewrite every occurrence of `old_name` in the case report table.
	pub fn change_country_name(&mut self, old_name: &str, new_name: &str) {
		let mut n = 0;
		for rec in self.reports.iter_mut() {
			if rec.country.as_str() == old_name {
				rec.country = new_name.into();
				n += 1;
			}
		}
		debug!("renamed {:?} to {:?} in {} reports", old_name, new_name, n);
	}

	pub fn list_countries(&self) -> Vec<Country> {
		let countries: BTreeSet<&Country> = self.reports.iter().map(|r| &r.country).collect();
		countries.into_iter().cloned().collect()
	}

	pub fn list_dates(&self) -> Vec<NaiveDate> {
		let dates: BTreeSet<NaiveDate> = self.reports.iter().map(|r| r.date).collect();
		dates.into_iter().collect()
	}

	/// Earliest and latest report date across all countries.
	pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
		let mut min = self.reports[0].date;
		let mut max = min;
		for rec in self.reports.iter() {
			min = min.min(rec.date);
			max = max.max(rec.date);
		}
		(min, max)
	}
}
