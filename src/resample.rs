use std::fmt;

use serde::Serialize;

use chrono::{Datelike, NaiveDate};

use super::densify::DenseRow;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
	Daily,
	Monthly,
}

impl Granularity {
	/// Label of the bucket containing `date`: the day itself, or the last
	/// day of its month.
	pub fn bucket(&self, date: NaiveDate) -> NaiveDate {
		match self {
			Self::Daily => date,
			Self::Monthly => last_day_of_month(date),
		}
	}

	/// Capitalized period name, as used in chart titles.
	pub fn period_name(&self) -> &'static str {
		match self {
			Self::Daily => "Day",
			Self::Monthly => "Month",
		}
	}
}

impl fmt::Display for Granularity {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Daily => f.write_str("daily"),
			Self::Monthly => f.write_str("monthly"),
		}
	}
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
	let (y, m) = if date.month() == 12 {
		(date.year() + 1, 1)
	} else {
		(date.year(), date.month() + 1)
	};
	match NaiveDate::from_ymd_opt(y, m, 1).and_then(|d| d.pred_opt()) {
		Some(d) => d,
		None => date,
	}
}


/// Fold date-ordered rows into consecutive buckets.
///
/// Buckets appear in chronological order; a bucket exists for every label
/// seen in `rows` and nowhere else.
pub fn resample<'a, A, I, F>(rows: I, granularity: Granularity, mut fold: F) -> Vec<(NaiveDate, A)>
	where A: Default,
	      I: IntoIterator<Item = &'a DenseRow>,
	      F: FnMut(&mut A, &DenseRow),
{
	let mut result: Vec<(NaiveDate, A)> = Vec::new();
	for row in rows {
		let label = granularity.bucket(row.date);
		let fresh = match result.last() {
			Some((last, _)) => *last != label,
			None => true,
		};
		if fresh {
			result.push((label, A::default()));
		}
		if let Some((_, acc)) = result.last_mut() {
			fold(acc, row);
		}
	}
	result
}
