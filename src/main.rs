use hargeo::analysis::Analysis;
use hargeo::config::Config;
use hargeo::exchange::extract_exchanges;
use hargeo::geo::GeoDatabase;
use hargeo::har::Har;
use hargeo::{dashboard, report};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    init_logging(&config.log_level);
    config.validate()?;

    let geo = GeoDatabase::open(&config.db, config.db_v6.as_ref())?;
    let har = Har::from_path(&config.har)?;
    let entries = har.log.entries_for(config.page.as_deref())?;
    info!("Analysing {} entries", entries.len());

    let extraction = extract_exchanges(entries, &geo)?;
    let analysis = Analysis::build(&extraction, config.top);

    report::print_report(&analysis)?;
    if let Some(path) = &config.json {
        report::export_json(path, &analysis, &extraction.exchanges)?;
    }
    if !config.no_chart {
        dashboard::run(&analysis, &config.source_name())?;
    }
    Ok(())
}
