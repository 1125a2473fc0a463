//! Combination execution command implementation.

use std::path::Path;

use anyhow::Result;
use ronda_composer::{Composer, Execution, StrategyOutcome};

use crate::OutputFormat;
use crate::data;

/// Execute `combination` over the CSV at `path` and print the signals.
pub(crate) fn run_combination(
    composer: &Composer,
    combination: &str,
    path: &Path,
    start: Option<&str>,
    end: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    // Unknown names fail before the file is read.
    let info = composer.get_combination_info(combination)?;

    let start = start.map(data::parse_date).transpose()?;
    let end = end.map(data::parse_date).transpose()?;
    let market_data = data::slice_dates(data::load_csv(path)?, start, end)?;
    tracing::info!(rows = market_data.len(), path = %path.display(), "market data loaded");

    let execution = composer.execute(combination, &market_data)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&execution)?),
        OutputFormat::Text => print_text(&execution, &info.strategies),
    }
    Ok(())
}

fn print_text(execution: &Execution, strategies: &[String]) {
    let report = &execution.report;
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:^60} ║", format!("{} ({})", report.combination, report.method));
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Strategies: {}", strategies.join(", "));
    for status in &report.strategies {
        let outcome = match &status.outcome {
            StrategyOutcome::Signals { rows } => format!("{rows} rows"),
            StrategyOutcome::Empty => "no output".to_string(),
            StrategyOutcome::Skipped { error } => format!("skipped: {error}"),
        };
        println!("  {:20} {outcome}", status.name);
    }
    println!();

    println!("{:<20} {:>6}", "Timestamp", "Signal");
    println!("{}", "-".repeat(27));
    for (ts, signal) in execution.signals.iter() {
        println!("{:<20} {:>6}", ts.format("%Y-%m-%d %H:%M"), signal.value());
    }
    println!();

    let (sell, hold, buy) = execution.signals.counts();
    println!("Buy: {buy}  Hold: {hold}  Sell: {sell}");
    if report.zeroed_by_filter > 0 {
        println!("Held by filters: {}", report.zeroed_by_filter);
    }
    println!();
}
