use std::fmt;

use serde::{Serialize, Serializer};

use super::error::{Error, Result};


/// A percentage rounded to two decimal places.
///
/// Always finite and within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Percentage(f64);

impl Percentage {
	pub fn zero() -> Self {
		Self(0.)
	}

	/// `numerator / denominator`, then `* 100`, then rounded to two places,
	/// in that order. Ties round to even on the exact binary value, so
	/// `3.125` becomes `3.12`. Negative inputs and ratios above one are
	/// clamped.
	pub fn checked(numerator: i64, denominator: i64) -> Result<Self> {
		if denominator <= 0 {
			return Err(Error::UndefinedRate{numerator, denominator})
		}
		let ratio = numerator as f64 / denominator as f64;
		let pct = ratio * 100.;
		let rounded = round2(pct);
		Ok(Self(rounded.max(0.).min(100.)))
	}

	/// Like [`checked`](Self::checked), with undefined rates reported as zero.
	pub fn or_zero(numerator: i64, denominator: i64) -> Self {
		Self::checked(numerator, denominator).unwrap_or_else(|_| Self::zero())
	}

	pub fn value(&self) -> f64 {
		self.0
	}
}

fn round2(v: f64) -> f64 {
	format!("{:.2}", v).parse().unwrap_or(v)
}

impl fmt::Display for Percentage {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		write!(f, "{:.2}", self.0)
	}
}

impl Serialize for Percentage {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.serialize_f64(self.0)
	}
}
