//! Monitor deployment lifecycle.
//!
//! A deploy either settles on the first invocation or falls into one of two
//! recovery paths:
//!
//! - `deploy` itself: when the tool cannot confirm the deploy, ping the agent.
//!   An unreachable agent fails fast; a reachable one gets a bounded number of
//!   re-deploys (command-level retry).
//! - `retry`: after a reported success the monitor may still be stopped, so
//!   re-deploy and re-check its status until it converges on `Started`.

use std::fmt;

use tracing::{error, info, warn};

use crate::agent::Agent;
use crate::error::{DeployError, Result};
use crate::fleet::Fleet;
use crate::markers::{classify_deploy, classify_listing, DeployReply, ListingReply, PingReply};

/// Extension carried by monitor configuration files in batch lists
pub const CONFIG_SUFFIX: &str = ".conf";

/// Terminal result of one `deploy` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Success,
    NotFound,
    FailedPing,
    FailedCommandPingSuccess,
    NewError(Vec<String>),
}

impl DeployOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeployOutcome::Success)
    }

    /// Label recorded in the batch report
    pub fn label(&self) -> &'static str {
        match self {
            DeployOutcome::Success => "Success",
            DeployOutcome::NotFound => "Not Found",
            DeployOutcome::FailedPing => "Failed Ping",
            DeployOutcome::FailedCommandPingSuccess => "Failed Command, Ping Success",
            DeployOutcome::NewError(_) => "New Error",
        }
    }
}

impl fmt::Display for DeployOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Monitor state as reported by the listing tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorStatus {
    Started,
    Stopped,
    NotDeployed,
    Other(String),
}

impl MonitorStatus {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "Started" => MonitorStatus::Started,
            "Stopped" => MonitorStatus::Stopped,
            other => MonitorStatus::Other(other.to_string()),
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self, MonitorStatus::Started)
    }
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorStatus::Started => write!(f, "Started"),
            MonitorStatus::Stopped => write!(f, "Stopped"),
            MonitorStatus::NotDeployed => write!(f, "Not deployed"),
            MonitorStatus::Other(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    pub name: String,
    /// Agent resolved by the last `get_agent` call
    pub agent: Option<String>,
}

impl Monitor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agent: None,
        }
    }

    /// Build a monitor from a batch list entry such as `MON1.conf\n`
    pub fn from_list_entry(entry: &str) -> Self {
        let trimmed = entry.trim();
        Self::new(trimmed.strip_suffix(CONFIG_SUFFIX).unwrap_or(trimmed))
    }

    /// Deploy the monitor, re-deploying up to `retries` times if the agent
    /// answers a ping after an unconfirmed deploy.
    pub fn deploy(&mut self, fleet: &Fleet, retries: u32) -> Result<DeployOutcome> {
        info!(monitor = %self.name, "Deploying monitor");
        let output = fleet.deploy(&self.name)?;

        let outcome = match classify_deploy(&output) {
            DeployReply::NotStaged => {
                error!(monitor = %self.name, "Can't find this monitor in staging");
                DeployOutcome::NotFound
            }
            DeployReply::Deployed => {
                info!(monitor = %self.name, "Monitor was deployed successfully");
                DeployOutcome::Success
            }
            DeployReply::NeedsAgentCheck => self.recover_unconfirmed(fleet, retries)?,
            DeployReply::Errors(lines) => {
                error!(monitor = %self.name, errors = ?lines, "Deployment has encountered errors");
                DeployOutcome::NewError(lines)
            }
        };

        if !outcome.is_success() {
            warn!(monitor = %self.name, outcome = %outcome, "Skipping monitor");
        }
        Ok(outcome)
    }

    fn recover_unconfirmed(&mut self, fleet: &Fleet, retries: u32) -> Result<DeployOutcome> {
        let agent = self.get_agent(fleet)?;
        match agent.ping(fleet)? {
            PingReply::Responded => {}
            PingReply::NotResponding => return Ok(DeployOutcome::FailedPing),
            PingReply::Unknown => {
                return Err(DeployError::Unknown {
                    tool: "ping".to_string(),
                })
            }
        }

        if retries > 0 {
            info!(
                agent = %agent.name,
                retries,
                "Agent responded to ping, retrying deploy"
            );
        }
        for attempt in 1..=retries {
            let output = fleet.deploy(&self.name)?;
            if classify_deploy(&output) == DeployReply::Deployed {
                info!(monitor = %self.name, attempt, "Monitor was deployed successfully");
                return Ok(DeployOutcome::Success);
            }
        }

        error!(agent = %agent.name, "Agent responded to ping but not to deploy commands");
        Ok(DeployOutcome::FailedCommandPingSuccess)
    }

    /// Status of the monitor on every agent hosting it
    pub fn check_status(&self, fleet: &Fleet) -> Result<Vec<MonitorStatus>> {
        info!(monitor = %self.name, "Checking monitor status");
        let output = fleet.list_monitor(&self.name, None)?;

        let statuses = self.listing_statuses(&output)?;
        info!(monitor = %self.name, statuses = ?statuses, "Monitor statuses");
        Ok(statuses)
    }

    /// Status of the monitor on one agent
    pub fn check_status_on(&self, fleet: &Fleet, agent: &str) -> Result<MonitorStatus> {
        info!(monitor = %self.name, agent, "Checking monitor status on agent");
        let output = fleet.list_monitor(&self.name, Some(agent))?;

        let status = self
            .listing_statuses(&output)?
            .into_iter()
            .next()
            .unwrap_or(MonitorStatus::NotDeployed);
        info!(monitor = %self.name, agent, status = %status, "Monitor status on agent");
        Ok(status)
    }

    fn listing_statuses(&self, output: &str) -> Result<Vec<MonitorStatus>> {
        match classify_listing(output) {
            ListingReply::NotDeployed => {
                warn!(monitor = %self.name, "Monitor is not deployed");
                Ok(vec![MonitorStatus::NotDeployed])
            }
            ListingReply::Statuses(values) if values.is_empty() => Err(DeployError::Parse {
                tool: "monitor listing".to_string(),
                reason: "monitor report has no status line".to_string(),
            }),
            ListingReply::Statuses(values) => {
                Ok(values.iter().map(|v| MonitorStatus::parse(v)).collect())
            }
            ListingReply::Unknown => Err(DeployError::Unknown {
                tool: "monitor listing".to_string(),
            }),
        }
    }

    /// Re-deploy and re-check up to `max_attempts` times until the monitor is
    /// started on `agent`.
    pub fn retry(&mut self, fleet: &Fleet, max_attempts: u32, agent: &str) -> bool {
        for attempt in 1..=max_attempts {
            info!(monitor = %self.name, attempt, "Retry");

            if let Err(e) = self.deploy(fleet, 0) {
                warn!(monitor = %self.name, attempt, error = %e, "Re-deploy failed");
            }

            match self.check_status_on(fleet, agent) {
                Ok(status) if status.is_started() => {
                    info!(
                        monitor = %self.name,
                        attempt,
                        "Monitor is now started after deployment retries"
                    );
                    return true;
                }
                Ok(_) => {}
                Err(e) => warn!(monitor = %self.name, attempt, error = %e, "Status check failed"),
            }
        }

        error!(
            monitor = %self.name,
            attempts = max_attempts,
            "Monitor is still stopped after deployment retries"
        );
        false
    }

    /// Resolve the agent named in the monitor's staged descriptor
    pub fn get_agent(&mut self, fleet: &Fleet) -> Result<Agent> {
        let name = fleet.staging().agent_for(&self.name)?;
        self.agent = Some(name.clone());
        Ok(Agent::new(name))
    }
}

impl fmt::Display for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
