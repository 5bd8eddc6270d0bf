//! Offline IP geolocation.
//!
//! Lookups go through [`GeoLookup`] so extraction does not care where the
//! answer comes from. [`GeoDatabase`] reads MaxMind DB files
//! (GeoLite2-City/Country, DB-IP Lite); [`StaticLookup`] answers from an
//! in-memory table.

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;

use maxminddb::{geoip2, MaxMindDBError, Reader};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
    /// ISO 3166-1 alpha-2 code
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Location {
    pub fn country(code: &str) -> Self {
        Location {
            country: Some(code.to_string()),
            ..Default::default()
        }
    }
}

pub trait GeoLookup {
    /// Addresses missing from the source resolve to `Location::default()`.
    fn locate(&self, ip: IpAddr) -> Result<Location>;
}

/// MMDB-backed lookup with an IPv4 database and an optional dedicated
/// IPv6 one.
pub struct GeoDatabase {
    v4: Reader<Vec<u8>>,
    v6: Option<Reader<Vec<u8>>>,
}

fn open(path: &Path) -> Result<Reader<Vec<u8>>> {
    let reader = Reader::open_readfile(path).map_err(|source| Error::DatabaseOpen {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "Opened {} ({}, IPv{}, {} nodes)",
        path.display(),
        reader.metadata.database_type,
        reader.metadata.ip_version,
        reader.metadata.node_count
    );
    Ok(reader)
}

impl GeoDatabase {
    pub fn open<P: AsRef<Path>>(v4: P, v6: Option<P>) -> Result<Self> {
        Ok(GeoDatabase {
            v4: open(v4.as_ref())?,
            v6: v6.map(|p| open(p.as_ref())).transpose()?,
        })
    }

    fn reader_for(&self, ip: IpAddr) -> &Reader<Vec<u8>> {
        match (ip, &self.v6) {
            (IpAddr::V6(_), Some(v6)) => v6,
            _ => &self.v4,
        }
    }
}

impl GeoLookup for GeoDatabase {
    fn locate(&self, ip: IpAddr) -> Result<Location> {
        let reader = self.reader_for(ip);
        if ip.is_ipv6() && reader.metadata.ip_version == 4 {
            warn!("No IPv6 database configured, cannot locate {}", ip);
            return Ok(Location::default());
        }

        let city: geoip2::City = match reader.lookup(ip) {
            Ok(city) => city,
            Err(MaxMindDBError::AddressNotFoundError(_)) => {
                debug!("{} not in database", ip);
                return Ok(Location::default());
            }
            Err(source) => return Err(Error::Lookup { ip, source }),
        };

        let (country, country_name) = match city.country {
            Some(c) => (
                c.iso_code.map(str::to_string),
                c.names
                    .as_ref()
                    .and_then(|n| n.get("en"))
                    .map(|s| s.to_string()),
            ),
            None => (None, None),
        };
        let (latitude, longitude) = city
            .location
            .map(|l| (l.latitude, l.longitude))
            .unwrap_or((None, None));

        Ok(Location {
            country,
            country_name,
            latitude,
            longitude,
        })
    }
}

/// Table-backed lookup; unknown addresses have no location.
#[derive(Debug, Default, Clone)]
pub struct StaticLookup {
    table: HashMap<IpAddr, Location>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ip: IpAddr, location: Location) {
        self.table.insert(ip, location);
    }

    pub fn with(mut self, ip: &str, country: &str) -> Self {
        if let Ok(ip) = ip.parse() {
            self.insert(ip, Location::country(country));
        }
        self
    }
}

impl GeoLookup for StaticLookup {
    fn locate(&self, ip: IpAddr) -> Result<Location> {
        Ok(self.table.get(&ip).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Built by tests/data/build_fixtures.py
    const DUAL_DB: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/geo-test.mmdb");
    const V4_DB: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/geo-test-v4.mmdb");

    fn ip(raw: &str) -> IpAddr {
        raw.parse().unwrap()
    }

    #[test]
    fn locates_ipv4_address() {
        let geo = GeoDatabase::open(DUAL_DB, None).unwrap();
        let loc = geo.locate(ip("192.0.2.10")).unwrap();
        assert_eq!(loc.country.as_deref(), Some("FR"));
        assert_eq!(loc.country_name.as_deref(), Some("France"));
        assert_eq!(loc.latitude, Some(48.8582));
        assert_eq!(loc.longitude, Some(2.3387));
    }

    #[test]
    fn ipv6_uses_main_database_without_dedicated_one() {
        let geo = GeoDatabase::open(DUAL_DB, None).unwrap();
        let loc = geo.locate(ip("2001:db8::7")).unwrap();
        assert_eq!(loc.country.as_deref(), Some("US"));
        assert_eq!(loc.latitude, None);
    }

    #[test]
    fn ipv6_goes_to_dedicated_database() {
        let geo = GeoDatabase::open(V4_DB, Some(DUAL_DB)).unwrap();
        assert_eq!(
            geo.locate(ip("2001:db8::7")).unwrap().country.as_deref(),
            Some("US")
        );
        assert_eq!(
            geo.locate(ip("192.0.2.10")).unwrap().country.as_deref(),
            Some("FR")
        );
    }

    #[test]
    fn absent_address_has_no_location() {
        let geo = GeoDatabase::open(DUAL_DB, None).unwrap();
        assert_eq!(geo.locate(ip("198.51.100.1")).unwrap(), Location::default());
        assert_eq!(geo.locate(ip("2001:db9::1")).unwrap(), Location::default());
    }

    #[test]
    fn ipv6_against_ipv4_only_database_has_no_location() {
        let geo = GeoDatabase::open(V4_DB, None).unwrap();
        assert_eq!(geo.locate(ip("2001:db8::7")).unwrap(), Location::default());
        assert_eq!(
            geo.locate(ip("192.0.2.200")).unwrap().country.as_deref(),
            Some("FR")
        );
    }

    #[test]
    fn static_lookup_answers_known_addresses() {
        let geo = StaticLookup::new()
            .with("192.0.2.10", "FR")
            .with("2606:4700::6812:1ef8", "US");
        let v4 = geo.locate("192.0.2.10".parse().unwrap()).unwrap();
        assert_eq!(v4.country.as_deref(), Some("FR"));
        let v6 = geo.locate("2606:4700::6812:1ef8".parse().unwrap()).unwrap();
        assert_eq!(v6.country.as_deref(), Some("US"));
    }

    #[test]
    fn static_lookup_unknown_is_empty() {
        let geo = StaticLookup::new();
        let loc = geo.locate("198.51.100.1".parse().unwrap()).unwrap();
        assert_eq!(loc, Location::default());
    }

    #[test]
    fn missing_database_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.mmdb");
        let err = GeoDatabase::open(&missing, None).err().unwrap();
        assert!(matches!(err, Error::DatabaseOpen { .. }));
    }

    #[test]
    fn garbage_database_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.mmdb");
        std::fs::write(&path, b"not a maxmind database").unwrap();
        assert!(GeoDatabase::open(&path, None).is_err());
    }
}
