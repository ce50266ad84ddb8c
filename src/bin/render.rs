use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use dotenvy::dotenv;

use tracing_subscriber::filter::EnvFilter;

use coronaboard::{render_dashboard, Config, SourcePaths};


fn main() -> Result<()> {
	dotenv().ok();
	let level = env::var("BOARD_LOG_LEVEL").unwrap_or_else(|_| "info".into());
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.compact()
		.init();

	let argv: Vec<String> = env::args().collect();
	if argv.len() > 3 {
		anyhow::bail!("usage: {} [data_dir] [output_file]", argv[0]);
	}

	let mut cfg = Config::load_from_env()?;
	if let Some(data_dir) = argv.get(1) {
		cfg.data_dir = PathBuf::from(data_dir);
		cfg.sources = SourcePaths::in_dir(&cfg.data_dir);
	}
	if let Some(output_file) = argv.get(2) {
		cfg.output_file = PathBuf::from(output_file);
	}
	cfg.log_config();

	let html = render_dashboard(&cfg)
		.with_context(|| format!("failed to render {}", cfg.output_file.display()))?;
	tracing::info!("dashboard ready ({} bytes)", html.len());
	Ok(())
}
