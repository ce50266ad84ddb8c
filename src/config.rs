use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use log::info;

use super::loader::SourcePaths;


/// Read an optional string variable, falling back to `$default`.
macro_rules! env_or {
	($var_name:expr, $default:expr) => {
		env::var($var_name).unwrap_or_else(|_| $default.into())
	};
}

/// Read an optional path variable, falling back to `$default`.
macro_rules! path_env_or {
	($var_name:expr, $default:expr) => {
		env::var_os($var_name).map(PathBuf::from).unwrap_or_else(|| $default)
	};
}


#[derive(Debug, Clone)]
pub struct Config {
	pub data_dir: PathBuf,
	pub sources: SourcePaths,
	/// Where the rendered dashboard is written.
	pub output_file: PathBuf,
	/// Country treated as the origin of the outbreak.
	pub epicenter: String,
	pub title: String,
	pub bind: SocketAddr,
}

pub static DEFAULT_TITLE: &'static str = "Corona Board";
pub static DEFAULT_EPICENTER: &'static str = "China";
pub static DEFAULT_OUTPUT_FILE: &'static str = "template/dash_board.html";

impl Config {
	/// Defaults for a data directory, independent of the environment.
	pub fn for_data_dir<P: Into<PathBuf>>(data_dir: P) -> Self {
		let data_dir = data_dir.into();
		Self{
			sources: SourcePaths::in_dir(&data_dir),
			data_dir,
			output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
			epicenter: DEFAULT_EPICENTER.into(),
			title: DEFAULT_TITLE.into(),
			bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
		}
	}

	/// Load from `BOARD_*` variables. Unset variables take their defaults,
	/// malformed ones are an error naming the variable.
	pub fn load_from_env() -> Result<Self> {
		let data_dir = path_env_or!("BOARD_DATA_DIR", PathBuf::from("data"));
		let SourcePaths{reports, coordinates, risk_assessment, testing_laboratories} = SourcePaths::in_dir(&data_dir);
		let sources = SourcePaths{
			reports: path_env_or!("BOARD_REPORTS_FILE", reports),
			coordinates: path_env_or!("BOARD_COORDINATES_FILE", coordinates),
			risk_assessment: path_env_or!("BOARD_RISK_FILE", risk_assessment),
			testing_laboratories: path_env_or!("BOARD_LABS_FILE", testing_laboratories),
		};
		let output_file = path_env_or!("BOARD_OUTPUT_FILE", PathBuf::from(DEFAULT_OUTPUT_FILE));
		let epicenter = env_or!("BOARD_EPICENTER", DEFAULT_EPICENTER);
		if epicenter.trim().is_empty() {
			return Err(anyhow!("Invalid BOARD_EPICENTER: must not be empty"))
		}
		let title = env_or!("BOARD_TITLE", DEFAULT_TITLE);
		let bind = env_or!("BOARD_BIND", "0.0.0.0:5000")
			.parse::<SocketAddr>()
			.map_err(|e| anyhow!("Invalid BOARD_BIND: {}", e))?;

		Ok(Self{
			data_dir,
			sources,
			output_file,
			epicenter,
			title,
			bind,
		})
	}

	pub fn log_config(&self) {
		info!("configuration loaded:");
		info!("  BOARD_DATA_DIR         : {}", self.data_dir.display());
		info!("  BOARD_REPORTS_FILE     : {}", self.sources.reports.display());
		info!("  BOARD_COORDINATES_FILE : {}", self.sources.coordinates.display());
		info!("  BOARD_RISK_FILE        : {}", self.sources.risk_assessment.display());
		info!("  BOARD_LABS_FILE        : {}", self.sources.testing_laboratories.display());
		info!("  BOARD_OUTPUT_FILE      : {}", self.output_file.display());
		info!("  BOARD_EPICENTER        : {}", self.epicenter);
		info!("  BOARD_TITLE            : {}", self.title);
		info!("  BOARD_BIND             : {}", self.bind);
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn data_dir_defaults() {
		let cfg = Config::for_data_dir("/srv/board");
		assert_eq!(cfg.sources.reports, PathBuf::from("/srv/board/corona_report.csv"));
		assert_eq!(cfg.sources.testing_laboratories, PathBuf::from("/srv/board/testing_laboratories.csv"));
		assert_eq!(cfg.epicenter, "China");
		assert_eq!(cfg.title, "Corona Board");
		assert_eq!(cfg.bind.port(), 5000);
	}

	// the only test touching the process environment
	#[test]
	fn environment_overrides_and_validation() {
		env::set_var("BOARD_DATA_DIR", "/tmp/board-data");
		env::set_var("BOARD_RISK_FILE", "/elsewhere/risk.csv");
		env::set_var("BOARD_BIND", "127.0.0.1:8088");
		let cfg = Config::load_from_env().unwrap();
		assert_eq!(cfg.sources.reports, PathBuf::from("/tmp/board-data/corona_report.csv"));
		assert_eq!(cfg.sources.risk_assessment, PathBuf::from("/elsewhere/risk.csv"));
		assert_eq!(cfg.sources.coordinates, PathBuf::from("/tmp/board-data/coordinates.csv"));
		assert_eq!(cfg.sources.testing_laboratories, PathBuf::from("/tmp/board-data/testing_laboratories.csv"));
		assert_eq!(cfg.bind, "127.0.0.1:8088".parse::<SocketAddr>().unwrap());

		env::set_var("BOARD_BIND", "not an address");
		let err = Config::load_from_env().unwrap_err();
		assert!(err.to_string().contains("BOARD_BIND"));

		env::remove_var("BOARD_DATA_DIR");
		env::remove_var("BOARD_RISK_FILE");
		env::remove_var("BOARD_BIND");
	}
}
