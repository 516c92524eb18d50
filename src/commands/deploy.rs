//! Bulk deploy command

use anyhow::{bail, Context, Result};
use chrono::Local;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::batch::{read_monitor_list, run_batch, BatchSummary, ReportWriter, RetryPolicy};
use crate::config::Config;

use super::process_fleet;

/// Deploy every monitor named in `list`, prompting for the path if absent
pub fn execute(list: Option<PathBuf>, config: &Config) -> Result<()> {
    let list = match list {
        Some(path) => path,
        None => prompt_for_list(&mut io::stdin().lock(), &mut io::stdout())?,
    };
    ensure_list_exists(&list)?;

    let monitors = read_monitor_list(&list)?;
    let policy = RetryPolicy {
        deploy_retries: config.deploy_retries,
        convergence_retries: config.convergence_retries,
    };

    println!(
        "{} Deploying {} monitor(s) from {}",
        "→".cyan().bold(),
        monitors.len(),
        list.display()
    );

    let report = ReportWriter::create(&config.report_dir, Local::now())?;
    let fleet = process_fleet(config);
    let summary = run_batch(&fleet, monitors, policy, report)?;

    print_summary(&summary);
    Ok(())
}

/// Abort before any processing when the list path is not a file
pub fn ensure_list_exists(list: &Path) -> Result<()> {
    if !list.is_file() {
        bail!("This file does not exist: {}", list.display());
    }
    Ok(())
}

fn prompt_for_list<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<PathBuf> {
    write!(
        output,
        "Please enter the path to the list file containing the monitors: "
    )?;
    output.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read list path")?;
    let input = answer.trim();

    if input.is_empty() {
        bail!("No list file given");
    }
    Ok(PathBuf::from(input))
}

fn print_summary(summary: &BatchSummary) {
    println!("\n{}", "Deployment Summary".bold().blue());
    println!("{}", "=".repeat(50));

    for record in &summary.records {
        let status = if record.is_started() {
            record.status.green()
        } else {
            record.status.red()
        };
        println!("  {:<40} {status}", record.monitor);
    }

    println!();
    println!(
        "  Started: {}  Failed: {}",
        summary.started_count().to_string().green().bold(),
        summary.failed_count().to_string().red().bold()
    );
    println!("  Report:  {}", summary.report_path.display());
}
