use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use multimap::MultiMap;
use serde::Serialize;
use tracing::debug;

use crate::exchange::Extraction;
use crate::models::record::Exchange;

/// Domain charts only show the largest groups.
pub const DOMAIN_CHART_LIMIT: usize = 15;

const BYTES_PER_KB: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Sent,
    Received,
    Count,
}

impl Metric {
    pub fn unit(self) -> &'static str {
        match self {
            Metric::Sent | Metric::Received => "Volume (KB)",
            Metric::Count => "Exchanges",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Country,
    Domain,
}

impl GroupKey {
    fn key(self, exchange: &Exchange) -> &str {
        match self {
            GroupKey::Country => exchange.country_label(),
            GroupKey::Domain => &exchange.domain,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            GroupKey::Country => "country",
            GroupKey::Domain => "second-level domain",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub label: String,
    pub value: f64,
}

/// One grouped series, sorted by ascending value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub title: String,
    pub unit: String,
    pub rows: Vec<Row>,
}

impl Breakdown {
    /// Keeps the `n` largest groups.
    pub fn tail(mut self, n: usize) -> Self {
        let cut = self.rows.len().saturating_sub(n);
        self.rows.drain(..cut);
        self
    }

    pub fn max_value(&self) -> f64 {
        self.rows.iter().map(|r| r.value).fold(0.0, f64::max)
    }
}

fn title(key: GroupKey, metric: Metric) -> String {
    let what = match metric {
        Metric::Sent => "Volume sent",
        Metric::Received => "Volume received",
        Metric::Count => "Exchanges",
    };
    format!("{} per {}", what, key.describe())
}

/// Groups exchanges by `key` and reduces each group with `metric`.
pub fn group(exchanges: &[Exchange], key: GroupKey, metric: Metric) -> Breakdown {
    let mut groups: MultiMap<&str, &Exchange> = MultiMap::new();
    for exchange in exchanges {
        groups.insert(key.key(exchange), exchange);
    }

    let mut rows: Vec<Row> = groups
        .iter_all()
        .map(|(label, members)| {
            let value = match metric {
                Metric::Sent => {
                    members.iter().map(|e| e.request_size).sum::<u64>() as f64 / BYTES_PER_KB
                }
                Metric::Received => {
                    members.iter().map(|e| e.response_size).sum::<u64>() as f64 / BYTES_PER_KB
                }
                Metric::Count => members.len() as f64,
            };
            Row {
                label: label.to_string(),
                value,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.value.total_cmp(&b.value).then_with(|| a.label.cmp(&b.label)));

    Breakdown {
        title: title(key, metric),
        unit: metric.unit().to_string(),
        rows,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub exchanges: usize,
    pub skipped: usize,
    pub domains: usize,
    pub countries: usize,
    pub sent_kb: f64,
    pub received_kb: f64,
    pub first_request: Option<DateTime<FixedOffset>>,
    pub last_request: Option<DateTime<FixedOffset>>,
}

impl Summary {
    pub fn from_extraction(extraction: &Extraction) -> Self {
        let exchanges = &extraction.exchanges;
        let domains: HashSet<&str> = exchanges.iter().map(|e| e.domain.as_str()).collect();
        // Unlocated servers are not a country
        let countries: HashSet<&str> = exchanges
            .iter()
            .filter_map(|e| e.country.as_deref())
            .collect();
        let started = exchanges.iter().filter_map(|e| e.started);

        Summary {
            exchanges: exchanges.len(),
            skipped: extraction.skipped,
            domains: domains.len(),
            countries: countries.len(),
            sent_kb: exchanges.iter().map(|e| e.request_size).sum::<u64>() as f64 / BYTES_PER_KB,
            received_kb: exchanges.iter().map(|e| e.response_size).sum::<u64>() as f64
                / BYTES_PER_KB,
            first_request: started.clone().min(),
            last_request: started.max(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub summary: Summary,
    pub breakdowns: Vec<Breakdown>,
}

impl Analysis {
    /// Summary plus the six standard charts: sent and received volume per
    /// country, then per domain, then exchange counts per country and per
    /// domain. Domain charts keep `domain_limit` rows.
    pub fn build(extraction: &Extraction, domain_limit: usize) -> Self {
        let exchanges = &extraction.exchanges;
        let breakdowns = vec![
            group(exchanges, GroupKey::Country, Metric::Sent),
            group(exchanges, GroupKey::Country, Metric::Received),
            group(exchanges, GroupKey::Domain, Metric::Sent).tail(domain_limit),
            group(exchanges, GroupKey::Domain, Metric::Received).tail(domain_limit),
            group(exchanges, GroupKey::Country, Metric::Count),
            group(exchanges, GroupKey::Domain, Metric::Count).tail(domain_limit),
        ];
        let summary = Summary::from_extraction(extraction);
        debug!(?summary, "analysis built");
        Analysis {
            summary,
            breakdowns,
        }
    }
}
