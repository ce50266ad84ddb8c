use log::info;

use smartstring::alias::{String as SmartString};

use chrono::NaiveDate;

use super::densify::DenseTable;
use super::error::Result;
use super::geo::continents;
use super::loader::{RawData, SourcePaths};
use super::query::Query;
use super::records::LocationLevel;
use super::summary::{global_summary, location_summary, GlobalSummary, LocationSummary};
use super::views::{LocationProfileViews, WorldWideViews};


/// Loaded and densified data, built once per request and dropped afterwards.
#[derive(Debug, Clone)]
pub struct Pipeline {
	raw: RawData,
	table: DenseTable,
	epicenter: SmartString,
}

impl Pipeline {
	pub fn load(paths: &SourcePaths, epicenter: &str) -> Result<Self> {
		let raw = RawData::load(paths)?;
		Ok(Self::from_raw(raw, epicenter))
	}

	pub fn from_raw(raw: RawData, epicenter: &str) -> Self {
		let table = DenseTable::build(&raw);
		info!(
			"densified {} countries over {} to {} ({} rows)",
			table.countries().len(),
			table.start(),
			table.end(),
			table.rows().len(),
		);
		Self{raw, table, epicenter: epicenter.into()}
	}

	pub fn query(&self) -> Query<'_> {
		Query::new(&self.table, &self.raw)
	}

	pub fn raw(&self) -> &RawData {
		&self.raw
	}

	pub fn table(&self) -> &DenseTable {
		&self.table
	}

	pub fn epicenter(&self) -> &str {
		self.epicenter.as_str()
	}

	/// The most recent date in the data set, used when no as-of date is given.
	pub fn latest_date(&self) -> NaiveDate {
		self.table.end()
	}

	fn resolve(&self, as_of: Option<NaiveDate>) -> NaiveDate {
		as_of.unwrap_or_else(|| self.latest_date())
	}

	pub fn global_summary(&self, as_of: Option<NaiveDate>) -> GlobalSummary {
		global_summary(&self.query(), self.resolve(as_of), self.epicenter())
	}

	pub fn location_summary(&self, as_of: Option<NaiveDate>, level: LocationLevel, location: &str) -> LocationSummary {
		location_summary(&self.query(), self.resolve(as_of), level, location)
	}

	pub fn world_wide(&self, as_of: Option<NaiveDate>) -> WorldWideViews {
		WorldWideViews::build(self.query(), self.resolve(as_of), self.epicenter())
	}

	pub fn location_profile(&self, as_of: Option<NaiveDate>, level: LocationLevel, location: &str) -> LocationProfileViews {
		LocationProfileViews::build(self.query(), self.resolve(as_of), self.epicenter(), level, location)
	}

	/// Profile of the epicenter country, the default location selection.
	pub fn epicenter_profile(&self, as_of: Option<NaiveDate>) -> LocationProfileViews {
		self.location_profile(as_of, LocationLevel::Country, self.epicenter())
	}

	pub fn continents(&self, as_of: Option<NaiveDate>) -> Vec<SmartString> {
		continents(&self.query(), self.resolve(as_of))
	}
}
