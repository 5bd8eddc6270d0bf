pub mod analysis;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod exchange;
pub mod geo;
pub mod har;
pub mod models;
pub mod report;

pub use error::{Error, Result};
