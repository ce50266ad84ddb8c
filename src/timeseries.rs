use std::collections::HashMap;
use std::hash::Hash;

use num_traits::Zero;

use chrono::NaiveDate;


pub trait TimeSeriesKey: Hash + Eq + Clone + std::fmt::Debug {}
impl<T: Hash + Eq + Clone + std::fmt::Debug> TimeSeriesKey for T {}


/// Dense per-key daily grid covering every day in `[start, last]`.
///
/// Keys which are never written to read as zero on every day once created.
#[derive(Debug, Clone)]
pub struct TimeSeries<T: Hash + Eq, V: Copy> {
	start: NaiveDate,
	keys: HashMap<T, usize>,
	time_series: Vec<Vec<V>>,
	len: usize,
}

impl<T: Hash + Eq, V: Copy> TimeSeries<T, V> {
	pub fn new(start: NaiveDate, last: NaiveDate) -> Self {
		let len = (last - start).num_days();
		assert!(len >= 0);
		let len = len as usize + 1;
		Self{
			start,
			len,
			keys: HashMap::new(),
			time_series: Vec::new(),
		}
	}

	#[inline(always)]
	pub fn date_index(&self, other: NaiveDate) -> Option<usize> {
		let days = (other - self.start).num_days();
		if days < 0 || days as usize >= self.len {
			return None
		}
		return Some(days as usize)
	}

	#[inline(always)]
	pub fn start(&self) -> NaiveDate {
		self.start
	}

	#[inline(always)]
	pub fn last(&self) -> NaiveDate {
		self.start + chrono::Duration::days(self.len as i64 - 1)
	}

	#[inline(always)]
	pub fn len(&self) -> usize {
		self.len
	}
}

impl<T: TimeSeriesKey, V: Copy + Zero> TimeSeries<T, V> {
	pub fn get_or_create(&mut self, k: T) -> &mut [V] {
		let index = self.get_index_or_create(k);
		&mut self.time_series[index][..]
	}

	pub fn get_index_or_create(&mut self, k: T) -> usize {
		match self.keys.get(&k) {
			Some(v) => *v,
			None => {
				let v = self.time_series.len();
				let mut vec = Vec::with_capacity(self.len);
				vec.resize(self.len, V::zero());
				self.time_series.push(vec);
				self.keys.insert(k, v);
				v
			},
		}
	}

	pub fn get_index(&self, k: &T) -> Option<usize> {
		Some(*self.keys.get(k)?)
	}

	pub fn get(&self, k: &T) -> Option<&[V]> {
		let index = self.get_index(k)?;
		Some(&self.time_series[index][..])
	}

	pub fn get_value(&self, k: &T, i: usize) -> Option<V> {
		if i >= self.len {
			return None
		}
		self.get(k).and_then(|v| { Some(v[i]) })
	}
}

impl<T: TimeSeriesKey> TimeSeries<T, u64> {
	/// Day-over-day differences of a cumulative series.
	///
	/// The first day keeps its cumulative value as the baseline. Downward
	/// corrections in the source come out negative and are not clamped.
	pub fn deltas(&self) -> TimeSeries<T, i64> {
		let mut result = TimeSeries::<T, i64>{
			start: self.start,
			len: self.len,
			keys: HashMap::with_capacity(self.keys.len()),
			time_series: Vec::with_capacity(self.time_series.len()),
		};
		for (k, index) in self.keys.iter() {
			let src = &self.time_series[*index];
			let dst = result.get_or_create(k.clone());
			let mut prev: i64 = 0;
			for (i, v) in src.iter().enumerate() {
				let v = *v as i64;
				dst[i] = v - prev;
				prev = v;
			}
		}
		result
	}
}


pub type Counters<T> = TimeSeries<T, u64>;
pub type Diff<T> = TimeSeries<T, i64>;


#[cfg(test)]
mod tests {
	use super::*;

	fn day(d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
	}

	#[test]
	fn range_is_inclusive() {
		let ts = Counters::<&str>::new(day(1), day(5));
		assert_eq!(ts.len(), 5);
		assert_eq!(ts.date_index(day(1)), Some(0));
		assert_eq!(ts.date_index(day(5)), Some(4));
		assert_eq!(ts.date_index(day(6)), None);
		assert_eq!(ts.last(), day(5));
	}

	#[test]
	fn created_keys_are_zero_filled() {
		let mut ts = Counters::<&str>::new(day(1), day(3));
		ts.get_or_create("a")[1] = 4;
		assert_eq!(ts.get(&"a").unwrap(), &[0, 4, 0][..]);
		assert_eq!(ts.get(&"b"), None);
		assert_eq!(ts.get_value(&"a", 3), None);
	}

	#[test]
	fn deltas_keep_first_day_as_baseline() {
		let mut ts = Counters::<&str>::new(day(1), day(5));
		ts.get_or_create("x").copy_from_slice(&[0, 0, 5, 5, 8]);
		ts.get_or_create("y").copy_from_slice(&[3, 3, 2, 2, 4]);
		let d = ts.deltas();
		assert_eq!(d.get(&"x").unwrap(), &[0, 0, 5, 0, 3][..]);
		assert_eq!(d.get(&"y").unwrap(), &[3, 0, -1, 0, 2][..]);
	}
}
