use std::io;
use std::io::Read;
use std::fs;
use std::path::Path;

use log::debug;

use serde::de::DeserializeOwned;

use flate2;

use super::error::{Error, Result};


pub fn magic_open<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn Read>> {
	let path = path.as_ref();
	match path.extension() {
		Some(x) if x == "gz" => {
			Ok(Box::new(flate2::read::GzDecoder::new(fs::File::open(path)?)))
		},
		_ => Ok(Box::new(fs::File::open(path)?)),
	}
}


/// Read a whole CSV table into memory, attributing failures to `path`.
pub fn read_table<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>> {
	let path = path.as_ref();
	let r = magic_open(path).map_err(|e| Error::io(path, e))?;
	let mut r = csv::ReaderBuilder::new()
		.trim(csv::Trim::Headers)
		.from_reader(r);
	let mut rows = Vec::new();
	for row in r.deserialize() {
		let rec: T = row.map_err(|e| Error::csv(path, e))?;
		rows.push(rec);
	}
	debug!("read {} rows from {}", rows.len(), path.display());
	Ok(rows)
}
