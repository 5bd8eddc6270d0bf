//! Error types for hargeo

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for hargeo operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The capture is not valid HAR JSON
    #[error("invalid HAR capture: {0}")]
    Json(#[from] serde_json::Error),

    #[error("page '{requested}' not found in capture (available: {})", available.join(", "))]
    UnknownPage {
        requested: String,
        available: Vec<String>,
    },

    #[error("geolocation database {path}: {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: maxminddb::MaxMindDBError,
    },

    #[error("geolocation lookup failed for {ip}: {source}")]
    Lookup {
        ip: std::net::IpAddr,
        #[source]
        source: maxminddb::MaxMindDBError,
    },

    #[error("configuration error: {0}")]
    Config(String),
}
