mod error;
mod ioutil;
mod timeseries;
mod records;
mod loader;
mod densify;
mod query;
mod rate;
mod resample;
mod aggregate;
mod summary;
mod geo;
mod views;
mod pipeline;
mod config;
pub mod dashboard;
pub mod web;

pub use error::*;
pub use ioutil::{magic_open, read_table};
pub use timeseries::*;
pub use records::*;
pub use loader::*;
pub use densify::*;
pub use query::*;
pub use rate::*;
pub use resample::*;
pub use aggregate::*;
pub use summary::*;
pub use geo::*;
pub use views::*;
pub use pipeline::*;
pub use config::*;
pub use dashboard::{render_dashboard, Dashboard};
