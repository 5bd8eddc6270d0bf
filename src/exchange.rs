//! Turns HAR entries into geolocated [`Exchange`] records.

use chrono::DateTime;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{second_level_domain, top_level_domain};
use crate::error::Result;
use crate::geo::GeoLookup;
use crate::har::Entry;
use crate::models::record::Exchange;

/// Exchanges kept from a capture, plus how many entries were dropped.
#[derive(Debug, Default)]
pub struct Extraction {
    pub exchanges: Vec<Exchange>,
    pub skipped: usize,
}

fn host_of(authority: &str) -> Option<String> {
    let url = Url::parse(&format!("http://{}/", authority.trim())).ok()?;
    url.host_str().map(str::to_string)
}

/// Server name the request was sent to, without port.
fn request_host(entry: &Entry) -> Option<String> {
    let request = &entry.request;
    request
        .header("host")
        .or_else(|| request.header(":authority"))
        .and_then(host_of)
        .or_else(|| {
            Url::parse(&request.url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
        })
        .filter(|h| !h.is_empty())
}

fn body_size(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

/// Builds the record for one entry. Entries without a server address
/// were blocked or served from cache and yield `None`.
pub fn analyse_entry<G: GeoLookup + ?Sized>(entry: &Entry, geo: &G) -> Result<Option<Exchange>> {
    let Some(server_ip) = entry.server_address() else {
        debug!("No server address for {}, skipping", entry.request.url);
        return Ok(None);
    };

    let hostname = request_host(entry)
        .unwrap_or_else(|| server_ip.to_string())
        .to_ascii_lowercase();
    let tld = top_level_domain(&hostname);
    let domain = second_level_domain(&hostname);
    let location = geo.locate(server_ip)?;
    let started = entry
        .started_date_time
        .as_deref()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok());

    let exchange = Exchange {
        hostname,
        tld,
        domain,
        request_size: body_size(entry.request.body_size),
        response_size: body_size(entry.response.body_size),
        country: location.country,
        url: entry.request.url.clone(),
        server_ip,
        latitude: location.latitude,
        longitude: location.longitude,
        started,
    };
    debug!(
        hostname = %exchange.hostname,
        domain = %exchange.domain,
        ip = %exchange.server_ip,
        country = exchange.country_label(),
        sent = exchange.request_size,
        received = exchange.response_size,
        "exchange"
    );
    Ok(Some(exchange))
}

pub fn extract_exchanges<'a, I, G>(entries: I, geo: &G) -> Result<Extraction>
where
    I: IntoIterator<Item = &'a Entry>,
    G: GeoLookup + ?Sized,
{
    let mut extraction = Extraction::default();
    for entry in entries {
        match analyse_entry(entry, geo)? {
            Some(exchange) => extraction.exchanges.push(exchange),
            None => extraction.skipped += 1,
        }
    }
    if extraction.skipped > 0 {
        warn!(
            "Ignored {} entries without a server address",
            extraction.skipped
        );
    }
    info!("Extracted {} exchanges", extraction.exchanges.len());
    Ok(extraction)
}
