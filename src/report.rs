//! Text and JSON output of an [`Analysis`].

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::analysis::{Analysis, Breakdown, Summary};
use crate::error::Result;
use crate::models::dto::ExchangeDTO;
use crate::models::record::Exchange;

const RULE_WIDTH: usize = 20;

fn write_summary<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "Exchanges analysed           : {}", summary.exchanges)?;
    writeln!(out, "Entries ignored (no address) : {}", summary.skipped)?;
    writeln!(out, "Second-level domains         : {}", summary.domains)?;
    writeln!(out, "Countries                    : {}", summary.countries)?;
    writeln!(out, "Volume sent (KB)             : {:.3}", summary.sent_kb)?;
    writeln!(out, "Volume received (KB)         : {:.3}", summary.received_kb)?;
    if let (Some(first), Some(last)) = (summary.first_request, summary.last_request) {
        writeln!(
            out,
            "Capture span                 : {} -> {} ({:.1}s)",
            first.to_rfc3339(),
            last.to_rfc3339(),
            (last - first).num_milliseconds() as f64 / 1000.0
        )?;
    }
    Ok(())
}

fn write_breakdown<W: Write>(out: &mut W, breakdown: &Breakdown) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{} [{}]", breakdown.title, breakdown.unit)?;
    if breakdown.rows.is_empty() {
        writeln!(out, "  (no data)")?;
        return Ok(());
    }
    let width = breakdown
        .rows
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0);
    // Largest first reads better in a terminal than the chart order
    for row in breakdown.rows.iter().rev() {
        writeln!(out, "  {:<width$}  {:>12.3}", row.label, row.value, width = width)?;
    }
    Ok(())
}

pub fn write_report<W: Write>(out: &mut W, analysis: &Analysis) -> io::Result<()> {
    write_summary(out, &analysis.summary)?;
    for breakdown in &analysis.breakdowns {
        write_breakdown(out, breakdown)?;
    }
    Ok(())
}

pub fn print_report(analysis: &Analysis) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, analysis)?;
    out.flush()
}

#[derive(Serialize)]
struct ExportDTO<'a> {
    summary: &'a Summary,
    breakdowns: &'a [Breakdown],
    exchanges: Vec<ExchangeDTO>,
}

pub fn write_json<W: Write>(out: W, analysis: &Analysis, exchanges: &[Exchange]) -> Result<()> {
    let export = ExportDTO {
        summary: &analysis.summary,
        breakdowns: &analysis.breakdowns,
        exchanges: exchanges.iter().map(ExchangeDTO::from).collect(),
    };
    serde_json::to_writer_pretty(out, &export)?;
    Ok(())
}

pub fn export_json<P: AsRef<Path>>(path: P, analysis: &Analysis, exchanges: &[Exchange]) -> Result<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    write_json(&mut out, analysis, exchanges)?;
    out.flush()?;
    info!("Wrote {} exchanges to {}", exchanges.len(), path.display());
    Ok(())
}
