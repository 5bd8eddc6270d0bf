use std::path::PathBuf;

use clap::Parser;

use crate::analysis::DOMAIN_CHART_LIMIT;
use crate::error::{Error, Result};

/// Geolocate the servers contacted in a HAR capture and chart the traffic
/// per country and per second-level domain.
#[derive(Debug, Parser)]
#[command(name = "hargeo", version, about)]
pub struct Config {
    /// HAR file exported from the browser's network console
    pub har: PathBuf,

    /// Only analyse entries of this page (e.g. page_1); all entries otherwise
    #[arg(short, long)]
    pub page: Option<String>,

    /// MaxMind DB file used for IPv4 (and IPv6 unless --db-v6 is given)
    #[arg(long, env = "HARGEO_DB")]
    pub db: PathBuf,

    /// Dedicated MaxMind DB file for IPv6 addresses
    #[arg(long, env = "HARGEO_DB_V6")]
    pub db_v6: Option<PathBuf>,

    /// Also write exchanges and aggregates as JSON
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Print the text report only, without the terminal charts
    #[arg(long)]
    pub no_chart: bool,

    /// Number of domains kept in the per-domain charts
    #[arg(long, default_value_t = DOMAIN_CHART_LIMIT)]
    pub top: usize,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Config {
    /// Parses the command line after loading a `.env` file, if any.
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Config::parse()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.har.is_file() {
            return Err(Error::Config(format!(
                "capture file {} does not exist",
                self.har.display()
            )));
        }
        for db in std::iter::once(&self.db).chain(self.db_v6.as_ref()) {
            if !db.is_file() {
                return Err(Error::Config(format!(
                    "geolocation database {} does not exist",
                    db.display()
                )));
            }
        }
        if self.top == 0 {
            return Err(Error::Config("--top must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Short name of the capture for display.
    pub fn source_name(&self) -> String {
        self.har
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.har.display().to_string())
    }
}
