use std::fmt;
use std::io;
use std::path::PathBuf;


pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	Io{path: PathBuf, source: io::Error},
	Csv{path: PathBuf, source: csv::Error},
	EmptyDataset,
	Json(serde_json::Error),
	/// The rendered dashboard could not be written.
	Output{path: PathBuf, source: io::Error},
	UndefinedRate{numerator: i64, denominator: i64},
}

impl Error {
	pub fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
		Self::Io{path: path.into(), source}
	}

	pub fn csv<P: Into<PathBuf>>(path: P, source: csv::Error) -> Self {
		Self::Csv{path: path.into(), source}
	}

	pub fn output<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
		Self::Output{path: path.into(), source}
	}

	/// Load errors abort the request before any computation happens.
	pub fn is_load_error(&self) -> bool {
		match self {
			Self::Io{..} | Self::Csv{..} | Self::EmptyDataset => true,
			_ => false,
		}
	}
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Io{path, source} => write!(f, "failed to read {}: {}", path.display(), source),
			Self::Csv{path, source} => write!(f, "malformed table {}: {}", path.display(), source),
			Self::EmptyDataset => f.write_str("case report table has no rows"),
			Self::Json(e) => write!(f, "failed to serialize dashboard: {}", e),
			Self::Output{path, source} => write!(f, "failed to write {}: {}", path.display(), source),
			Self::UndefinedRate{numerator, denominator} => write!(f, "undefined rate {}/{}", numerator, denominator),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Io{source, ..} => Some(source),
			Self::Csv{source, ..} => Some(source),
			Self::Json(e) => Some(e),
			Self::Output{source, ..} => Some(source),
			_ => None,
		}
	}
}

impl From<serde_json::Error> for Error {
	fn from(other: serde_json::Error) -> Self {
		Self::Json(other)
	}
}
