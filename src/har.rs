//! Serde model of a HAR 1.2 capture.
//!
//! Only the fields the analysis needs are modelled; everything else in the
//! browser export is ignored on deserialization.

use std::fs;
use std::io::Read;
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
pub struct Har {
    pub log: Log,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub creator: Option<Creator>,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Creator {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub started_date_time: Option<String>,
}

/// One request/response exchange.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default)]
    pub pageref: Option<String>,
    #[serde(default)]
    pub started_date_time: Option<String>,
    /// Total elapsed time in milliseconds.
    #[serde(default)]
    pub time: Option<f64>,
    pub request: Request,
    pub response: Response,
    #[serde(rename = "serverIPAddress", default)]
    pub server_ip_address: Option<String>,
    #[serde(default)]
    pub connection: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default)]
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub http_version: Option<String>,
    #[serde(default)]
    pub headers: Vec<Header>,
    /// -1 when the browser did not record it
    #[serde(default = "unknown_size")]
    pub body_size: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default = "unknown_size")]
    pub body_size: i64,
}

#[derive(Debug, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

fn unknown_size() -> i64 {
    -1
}

impl Har {
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        raw.parse()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let har: Har = raw.parse()?;
        info!(
            "Loaded {} with {} pages and {} entries",
            path.display(),
            har.log.pages.len(),
            har.log.entries.len()
        );
        Ok(har)
    }
}

impl FromStr for Har {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        // Firefox exports start with a byte order mark
        let raw = raw.trim_start_matches('\u{feff}');
        Ok(serde_json::from_str(raw)?)
    }
}

impl Log {
    pub fn page_ids(&self) -> Vec<String> {
        self.pages.iter().map(|p| p.id.clone()).collect()
    }

    /// Entries belonging to `page`, or every entry when no page is given.
    pub fn entries_for(&self, page: Option<&str>) -> Result<Vec<&Entry>> {
        let Some(page) = page else {
            return Ok(self.entries.iter().collect());
        };

        if !self.pages.iter().any(|p| p.id == page) {
            return Err(Error::UnknownPage {
                requested: page.to_string(),
                available: self.page_ids(),
            });
        }

        let entries: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|e| e.pageref.as_deref() == Some(page))
            .collect();
        debug!("Page {} has {} entries", page, entries.len());
        Ok(entries)
    }
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [Header], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

impl Entry {
    /// Address of the remote server. Blocked and cache-served requests
    /// have no (or an empty) `serverIPAddress`.
    pub fn server_address(&self) -> Option<IpAddr> {
        let raw = self.server_ip_address.as_deref()?.trim();
        let raw = raw
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .unwrap_or(raw);
        raw.parse().ok()
    }
}
