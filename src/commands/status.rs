//! Monitor status command

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;
use crate::monitor::{Monitor, MonitorStatus};

use super::process_fleet;

/// Show the status of `monitor`, on one agent or across the fleet
pub fn execute(monitor: &str, agent: Option<&str>, config: &Config) -> Result<()> {
    let fleet = process_fleet(config);
    let monitor = Monitor::from_list_entry(monitor);

    let statuses = match agent {
        Some(agent) => vec![monitor
            .check_status_on(&fleet, agent)
            .with_context(|| format!("Failed to check '{monitor}' on agent '{agent}'"))?],
        None => monitor
            .check_status(&fleet)
            .with_context(|| format!("Failed to check '{monitor}'"))?,
    };

    println!("{} {}", "Monitor:".bold(), monitor.name);
    for status in &statuses {
        println!("  {}", format_status(status));
    }
    Ok(())
}

fn format_status(status: &MonitorStatus) -> colored::ColoredString {
    match status {
        MonitorStatus::Started => status.to_string().green(),
        MonitorStatus::Stopped => status.to_string().red(),
        MonitorStatus::NotDeployed => status.to_string().yellow(),
        MonitorStatus::Other(_) => status.to_string().normal(),
    }
}
