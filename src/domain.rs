//! Hostname splitting.
//!
//! `www.elysee.fr` has the top-level domain `fr` and the second-level
//! domain `elysee.fr`. No public suffix list is consulted, so
//! `www.sydney.edu.au` yields `edu.au`. IPv4 literals are split like any
//! other name; IPv6 literals have no labels and are kept whole.

use std::net::Ipv6Addr;

fn normalize(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn is_ipv6_literal(host: &str) -> bool {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<Ipv6Addr>()
        .is_ok()
}

/// Text after the last dot. IPv6 literals have no TLD.
pub fn top_level_domain(host: &str) -> String {
    let host = normalize(host);
    if is_ipv6_literal(&host) {
        return String::new();
    }
    match host.rsplit_once('.') {
        Some((_, tld)) => tld.to_string(),
        None => host,
    }
}

/// Last two labels. Hosts with a single label, and IPv6 literals, are
/// returned whole.
pub fn second_level_domain(host: &str) -> String {
    let host = normalize(host);
    if is_ipv6_literal(&host) {
        return host;
    }
    let labels: Vec<&str> = host.rsplitn(3, '.').collect();
    match labels.as_slice() {
        [tld, sld, ..] => format!("{}.{}", sld, tld),
        _ => host,
    }
}
