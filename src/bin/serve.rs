use std::env;

use anyhow::Result;

use dotenvy::dotenv;

use tracing_subscriber::filter::EnvFilter;

use coronaboard::web;
use coronaboard::Config;


fn init_tracing() {
	// RUST_LOG wins over BOARD_LOG_LEVEL
	let env_filter = if env::var("RUST_LOG").is_ok() {
		EnvFilter::from_default_env()
	} else {
		let level = match env::var("BOARD_LOG_LEVEL").ok().as_deref() {
			Some("trace") => "trace",
			Some("debug") => "debug",
			Some("warn") => "warn",
			Some("error") => "error",
			_ => "info",
		};
		EnvFilter::new(level)
	};

	tracing_subscriber::fmt()
		.with_target(true)
		.with_env_filter(env_filter)
		.compact()
		.init();
}

#[tokio::main]
async fn main() -> Result<()> {
	dotenv().ok();
	init_tracing();

	let cfg = Config::load_from_env()?;
	cfg.log_config();
	let bind = cfg.bind;

	let app = web::router(cfg);
	let listener = tokio::net::TcpListener::bind(bind).await?;
	tracing::info!("listening on {}", bind);
	axum::serve(listener, app).await?;

	Ok(())
}
