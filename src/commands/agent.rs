//! Agent inspection command

use anyhow::{Context, Result};
use colored::Colorize;

use crate::agent::Agent;
use crate::config::Config;
use crate::markers::PingReply;

use super::process_fleet;

/// Show availability and queue manager of `name`, optionally pinging it
pub fn execute(name: &str, ping: bool, config: &Config) -> Result<()> {
    let fleet = process_fleet(config);
    let mut agent = Agent::new(name);
    let derived = agent.queue_manager.clone();

    let availability = agent
        .get_status(&fleet)
        .with_context(|| format!("Failed to query agent '{name}'"))?;

    println!("{} {}", "Agent:".bold(), agent.name);
    println!("  Availability:   {availability}");
    println!("  Queue manager:  {}", agent.queue_manager);
    if derived != agent.queue_manager {
        println!("  {} name suggests {derived}", "Note:".yellow());
    }

    if ping {
        let reply = agent
            .ping(&fleet)
            .with_context(|| format!("Failed to ping agent '{name}'"))?;
        let shown = match reply {
            PingReply::Responded => "responded".green(),
            PingReply::NotResponding => "not responding".red(),
            PingReply::Unknown => "unrecognized reply".yellow(),
        };
        println!("  Ping:           {shown}");
    }
    Ok(())
}
