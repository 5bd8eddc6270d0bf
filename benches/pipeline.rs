use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hargeo::analysis::{Analysis, DOMAIN_CHART_LIMIT};
use hargeo::exchange::extract_exchanges;
use hargeo::geo::StaticLookup;
use hargeo::har::Har;

const HOSTS: [&str; 8] = [
    "www.elysee.fr",
    "static.elysee.fr",
    "www.google.com",
    "fonts.gstatic.com",
    "cdn.jsdelivr.net",
    "www.sydney.edu.au",
    "connect.facebook.net",
    "analytics.example.org",
];

fn capture(entries: usize) -> String {
    let items: Vec<String> = (0..entries)
        .map(|i| {
            format!(
                r#"{{"pageref": "page_1", "request": {{"url": "https://{host}/r/{i}", "headers": [{{"name": "Host", "value": "{host}"}}], "bodySize": {sent}}}, "response": {{"headers": [], "bodySize": {recv}}}, "serverIPAddress": "192.0.2.{octet}"}}"#,
                host = HOSTS[i % HOSTS.len()],
                i = i,
                sent = i % 700,
                recv = (i * 37) % 90_000,
                octet = i % HOSTS.len(),
            )
        })
        .collect();
    format!(
        r#"{{"log": {{"pages": [{{"id": "page_1"}}], "entries": [{}]}}}}"#,
        items.join(",")
    )
}

fn geo() -> StaticLookup {
    ["FR", "FR", "US", "US", "NL", "AU", "IE", "DE"]
        .iter()
        .enumerate()
        .fold(StaticLookup::new(), |geo, (i, cc)| {
            geo.with(&format!("192.0.2.{}", i), cc)
        })
}

fn bench_pipeline(c: &mut Criterion) {
    let raw = capture(5_000);
    let geo = geo();

    c.bench_function("parse_har_5000", |b| {
        b.iter(|| black_box(&raw).parse::<Har>().unwrap())
    });

    let har = raw.parse::<Har>().unwrap();
    c.bench_function("extract_5000", |b| {
        b.iter(|| extract_exchanges(black_box(&har.log.entries), &geo).unwrap())
    });

    let extraction = extract_exchanges(&har.log.entries, &geo).unwrap();
    c.bench_function("analyse_5000", |b| {
        b.iter(|| Analysis::build(black_box(&extraction), DOMAIN_CHART_LIMIT))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
