use std::fs;

use hargeo::analysis::{Analysis, DOMAIN_CHART_LIMIT};
use hargeo::exchange::extract_exchanges;
use hargeo::geo::StaticLookup;
use hargeo::har::Har;
use hargeo::report;
use hargeo::Error;

const CAPTURE: &str = r#"{
  "log": {
    "version": "1.2",
    "creator": {"name": "Chrome", "version": "119"},
    "pages": [{"id": "page_1"}, {"id": "page_3"}],
    "entries": [
      {"pageref": "page_1", "startedDateTime": "2022-12-01T09:00:00.000Z",
       "request": {"url": "https://www.elysee.fr/", "headers": [], "bodySize": 0},
       "response": {"headers": [], "bodySize": 1000}, "serverIPAddress": "192.0.2.10"},
      {"pageref": "page_3", "startedDateTime": "2022-12-01T09:00:01.000Z",
       "request": {"url": "https://www.sydney.edu.au/", "headers": [], "bodySize": 2000},
       "response": {"headers": [], "bodySize": 64000}, "serverIPAddress": "[2606:4700::6812:1ef8]"},
      {"pageref": "page_3", "startedDateTime": "2022-12-01T09:00:02.500Z",
       "request": {"url": "https://cdn.sydney.edu.au/app.js", "headers": [], "bodySize": 0},
       "response": {"headers": [], "bodySize": 16000}, "serverIPAddress": "2606:4700::6812:1ef8"},
      {"pageref": "page_3",
       "request": {"url": "https://doubleclick.net/ad", "headers": [], "bodySize": 0},
       "response": {"headers": [], "bodySize": 0}, "serverIPAddress": ""},
      {"pageref": "page_3", "startedDateTime": "2022-12-01T09:00:03.000Z",
       "request": {"url": "https://stats.example.org/hit", "headers": [], "bodySize": 500},
       "response": {"headers": [], "bodySize": 200}, "serverIPAddress": "203.0.113.9"}
    ]
  }
}"#;

fn geo() -> StaticLookup {
    StaticLookup::new()
        .with("192.0.2.10", "FR")
        .with("2606:4700::6812:1ef8", "US")
}

#[test]
fn page_three_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.har");
    fs::write(&path, CAPTURE).unwrap();

    let har = Har::from_path(&path).unwrap();
    let entries = har.log.entries_for(Some("page_3")).unwrap();
    assert_eq!(entries.len(), 4);

    let extraction = extract_exchanges(entries, &geo()).unwrap();
    assert_eq!(extraction.exchanges.len(), 3);
    assert_eq!(extraction.skipped, 1);

    let analysis = Analysis::build(&extraction, DOMAIN_CHART_LIMIT);
    assert_eq!(analysis.summary.domains, 2);
    assert_eq!(analysis.summary.countries, 1);

    let received_by_country = &analysis.breakdowns[1];
    let labels: Vec<&str> = received_by_country
        .rows
        .iter()
        .map(|r| r.label.as_str())
        .collect();
    assert_eq!(labels, vec!["-", "US"]);
    assert_eq!(received_by_country.rows[1].value, 80.0);

    let count_by_domain = &analysis.breakdowns[5];
    let top = count_by_domain.rows.last().unwrap();
    assert_eq!(top.label, "edu.au");
    assert_eq!(top.value, 2.0);

    let span = analysis.summary.last_request.unwrap() - analysis.summary.first_request.unwrap();
    assert_eq!(span.num_milliseconds(), 2000);

    let json = dir.path().join("out.json");
    report::export_json(&json, &analysis, &extraction.exchanges).unwrap();
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(value["exchanges"].as_array().unwrap().len(), 3);
}

#[test]
fn whole_capture_when_no_page_given() {
    let har = CAPTURE.parse::<Har>().unwrap();
    let entries = har.log.entries_for(None).unwrap();
    let extraction = extract_exchanges(entries, &geo()).unwrap();
    let analysis = Analysis::build(&extraction, 1);

    assert_eq!(analysis.summary.exchanges, 4);
    assert_eq!(analysis.summary.domains, 3);
    // domain charts are cut to the single largest group
    assert_eq!(analysis.breakdowns[2].rows.len(), 1);
    assert_eq!(analysis.breakdowns[0].rows.len(), 3);
}

#[test]
fn wrong_page_id_is_reported() {
    let har = CAPTURE.parse::<Har>().unwrap();
    match har.log.entries_for(Some("page_2")) {
        Err(Error::UnknownPage { available, .. }) => {
            assert_eq!(available, vec!["page_1", "page_3"])
        }
        other => panic!("unexpected: {:?}", other.map(|e| e.len())),
    }
}
