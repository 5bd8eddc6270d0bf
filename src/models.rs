pub mod record {
    use chrono::{DateTime, FixedOffset};
    use std::net::IpAddr;

    /// One geolocated network exchange.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Exchange {
        pub hostname: String,
        pub tld: String,
        /// Second-level domain
        pub domain: String,
        pub request_size: u64,
        pub response_size: u64,
        pub country: Option<String>,
        pub url: String,
        pub server_ip: IpAddr,
        pub latitude: Option<f64>,
        pub longitude: Option<f64>,
        pub started: Option<DateTime<FixedOffset>>,
    }

    /// Label used when the server could not be located.
    pub const UNKNOWN_COUNTRY: &str = "-";

    impl Exchange {
        pub fn country_label(&self) -> &str {
            self.country.as_deref().unwrap_or(UNKNOWN_COUNTRY)
        }
    }
}

pub mod dto {
    use serde::Serialize;

    use super::record::Exchange;

    #[derive(Debug, Serialize, Clone)]
    pub struct ExchangeDTO {
        pub hostname: String,
        pub tld: String,
        pub domain: String,
        pub request_size: u64,
        pub response_size: u64,
        pub country: Option<String>,
        pub url: String,
        pub server_ip: String,
        pub latitude: Option<f64>,
        pub longitude: Option<f64>,
        pub started: Option<String>,
    }

    impl From<&Exchange> for ExchangeDTO {
        fn from(e: &Exchange) -> Self {
            ExchangeDTO {
                hostname: e.hostname.clone(),
                tld: e.tld.clone(),
                domain: e.domain.clone(),
                request_size: e.request_size,
                response_size: e.response_size,
                country: e.country.clone(),
                url: e.url.clone(),
                server_ip: e.server_ip.to_string(),
                latitude: e.latitude,
                longitude: e.longitude,
                started: e.started.map(|t| t.to_rfc3339()),
            }
        }
    }
}
