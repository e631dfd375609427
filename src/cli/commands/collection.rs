//! Collection command - list discovered ducks

use crate::app::App;
use crate::cli::args::{CollectionArgs, OutputFormat};
use crate::error::DexResult;
use crate::ledger::DiscoveryRecord;
use crate::ui::{self, UiContext};
use chrono::{Local, TimeZone};
use console::style;

/// Execute the collection command
pub async fn execute(args: CollectionArgs, app: &App) -> DexResult<()> {
    let records = app.ledger().list().await?;

    if records.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, "No ducks yet. Scan one with: duckdex discover");
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&records),
        OutputFormat::Json => print_json(&records)?,
        OutputFormat::Plain => print_plain(&records),
    }

    Ok(())
}

fn print_table(records: &[DiscoveryRecord]) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "My Ducks");

    println!(
        "{:<16} {:<24} {:<18} {:>6}",
        style("KEY").bold(),
        style("NAME").bold(),
        style("FIRST FOUND").bold(),
        style("SCANS").bold()
    );
    println!("{}", "-".repeat(67));

    for record in records {
        let found = Local
            .timestamp_millis_opt(record.first_found)
            .single()
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        println!(
            "{:<16} {:<24} {:<18} {:>6}",
            truncate(&record.key, 16),
            truncate(&record.name, 24),
            found,
            record.scans
        );
    }

    println!();
    println!("{} duck(s)", records.len());
}

fn print_json(records: &[DiscoveryRecord]) -> DexResult<()> {
    println!("{}", serde_json::to_string_pretty(records)?);
    Ok(())
}

fn print_plain(records: &[DiscoveryRecord]) {
    for record in records {
        println!("{}", record.key);
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
