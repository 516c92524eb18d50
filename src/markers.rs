//! Marker codes printed by the fleet tools, and the classifiers that turn raw
//! tool output into closed reply enums.
//!
//! All matching is by substring, never by whole line, so extra decoration the
//! tools add around a message code does not change the verdict.

use crate::error::{DeployError, Result};

/// Deploy tool: the monitor is not present in any staging area
pub const DEPLOY_NOT_STAGED: &str = "not found! Maybe not staged?";
/// Deploy tool: the monitor was deployed
pub const DEPLOY_SUCCESS: &str = "BFGCL0251I";
/// Deploy tool: the request was sent but the agent did not confirm it
pub const DEPLOY_PARTIAL: &str = "BFGCL0253W";
/// Prefix shared by every fleet message code
pub const MESSAGE_CODE: &str = "BFG";

/// Ping tool: the agent answered
pub const PING_RESPONDED: &str = "BFGCL0213I";
/// Ping tool: the agent did not answer within the tool's own timeout
pub const PING_NO_RESPONSE: &str = "BFGCL0214I";

/// Listing tool: the monitor is not deployed on the queried agent(s)
pub const MONITOR_NOT_DEPLOYED: &str = "BFGCL0242W";
/// Listing tool: a monitor report follows
pub const MONITOR_INFORMATION: &str = "Monitor Information";
/// Listing tool: key of the per-agent status line
pub const STATUS_KEY: &str = "Status";

/// Detail tool: section header followed by the queue manager line
pub const QUEUE_MANAGER_SECTION: &str = "Queue Manager Information:";
/// Detail tool: section header followed by the availability line
pub const AVAILABILITY_SECTION: &str = "Agent Availability Information:";

/// What a single deploy invocation reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployReply {
    NotStaged,
    Deployed,
    NeedsAgentCheck,
    /// Anything else, with every message-code line the tool printed
    Errors(Vec<String>),
}

/// What a ping invocation reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingReply {
    Responded,
    NotResponding,
    Unknown,
}

impl PingReply {
    pub fn responded(self) -> bool {
        matches!(self, PingReply::Responded)
    }
}

/// What a monitor listing reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingReply {
    NotDeployed,
    Statuses(Vec<String>),
    Unknown,
}

/// Values read from an agent detail report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDetails {
    pub queue_manager: String,
    pub availability: String,
}

/// Classify deploy output. Precedence: not staged, success, partial, errors.
pub fn classify_deploy(output: &str) -> DeployReply {
    if output.contains(DEPLOY_NOT_STAGED) {
        DeployReply::NotStaged
    } else if output.contains(DEPLOY_SUCCESS) {
        DeployReply::Deployed
    } else if output.contains(DEPLOY_PARTIAL) {
        DeployReply::NeedsAgentCheck
    } else {
        DeployReply::Errors(message_lines(output))
    }
}

/// Classify ping output.
pub fn classify_ping(output: &str) -> PingReply {
    if output.contains(PING_RESPONDED) {
        PingReply::Responded
    } else if output.contains(PING_NO_RESPONSE) {
        PingReply::NotResponding
    } else {
        PingReply::Unknown
    }
}

/// Classify monitor listing output.
pub fn classify_listing(output: &str) -> ListingReply {
    if output.contains(MONITOR_NOT_DEPLOYED) {
        return ListingReply::NotDeployed;
    }
    if !output.contains(MONITOR_INFORMATION) {
        return ListingReply::Unknown;
    }

    let statuses = output
        .lines()
        .filter_map(|line| line.split_once(':'))
        .filter(|(key, _)| key.trim() == STATUS_KEY)
        .map(|(_, value)| value.trim().to_string())
        .collect();
    ListingReply::Statuses(statuses)
}

/// Parse an agent detail report.
///
/// Both section headers must be present, each followed by a `key: value` line.
pub fn parse_agent_details(output: &str) -> Result<AgentDetails> {
    let lines: Vec<&str> = output.lines().map(str::trim).collect();

    Ok(AgentDetails {
        queue_manager: section_value(&lines, QUEUE_MANAGER_SECTION)?,
        availability: section_value(&lines, AVAILABILITY_SECTION)?,
    })
}

fn section_value(lines: &[&str], header: &str) -> Result<String> {
    let parse_error = |reason: String| DeployError::Parse {
        tool: "agent details".to_string(),
        reason,
    };

    let index = lines
        .iter()
        .position(|line| *line == header)
        .ok_or_else(|| parse_error(format!("missing section '{header}'")))?;

    let next = lines
        .get(index + 1)
        .ok_or_else(|| parse_error(format!("section '{header}' is empty")))?;

    next.split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .ok_or_else(|| parse_error(format!("no value after '{header}'")))
}

fn message_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.contains(MESSAGE_CODE))
        .map(|line| line.trim().to_string())
        .collect()
}
