use std::sync::Arc;

use axum::{
	extract::State,
	http::StatusCode,
	response::{Html, IntoResponse, Response},
	routing::get,
	Router,
};

use log::{error, info};

use super::config::Config;
use super::dashboard::render_dashboard;
use super::error::Error;


pub fn router(cfg: Config) -> Router {
	Router::new()
		.route("/", get(dashboard))
		.with_state(Arc::new(cfg))
}

/// Rebuild the dashboard from the source files on every request.
async fn dashboard(State(cfg): State<Arc<Config>>) -> Response {
	info!("GET / - rendering dashboard");
	let job_cfg = cfg.clone();
	let result = tokio::task::spawn_blocking(move || render_dashboard(&job_cfg)).await;
	match result {
		Ok(Ok(html)) => Html(html).into_response(),
		Ok(Err(e)) => {
			error!("failed to render dashboard: {}", e);
			let msg = match e {
				ref e if e.is_load_error() => "Failed to load the source data",
				Error::Output{..} => "Failed to write the dashboard",
				_ => "Failed to render the dashboard",
			};
			(StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
		},
		Err(e) => {
			error!("dashboard worker failed: {}", e);
			(StatusCode::INTERNAL_SERVER_ERROR, "Failed to render the dashboard").into_response()
		},
	}
}
