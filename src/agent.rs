//! Fleet agents: queue manager resolution, ping and availability queries.

use tracing::{error, info, warn};

use crate::error::Result;
use crate::fleet::Fleet;
use crate::markers::{classify_ping, parse_agent_details, PingReply};

/// Leading tag of agents following the bridge naming standard
const BRIDGE_SITE_TAG: &str = "XN";
/// Tag found at [`BRIDGE_ROLE_OFFSET`] in bridge agent names
const BRIDGE_ROLE_TAG: &str = "BR";
const BRIDGE_ROLE_OFFSET: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub name: String,
    pub queue_manager: String,
}

impl Agent {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let queue_manager = resolve_queue_manager(&name);
        Self {
            name,
            queue_manager,
        }
    }

    /// Ping the agent through its queue manager.
    pub fn ping(&self, fleet: &Fleet) -> Result<PingReply> {
        info!(
            agent = %self.name,
            "Agent seems not to respond to deploy command, pinging agent"
        );
        let output = fleet.ping_agent(&self.queue_manager, &self.name)?;

        let reply = classify_ping(&output);
        match reply {
            PingReply::Responded => info!(agent = %self.name, "Agent has responded to ping"),
            PingReply::NotResponding => error!(agent = %self.name, "Agent not responding to ping"),
            PingReply::Unknown => warn!(
                agent = %self.name,
                output = %output.trim(),
                "Ping output carried no known response code"
            ),
        }
        Ok(reply)
    }

    /// Query the agent's availability.
    ///
    /// The live queue manager reported by the tool replaces the one derived
    /// from the agent name.
    pub fn get_status(&mut self, fleet: &Fleet) -> Result<String> {
        let output = fleet.agent_details(&self.name)?;
        let details = parse_agent_details(&output)?;

        if details.queue_manager != self.queue_manager {
            info!(
                agent = %self.name,
                derived = %self.queue_manager,
                live = %details.queue_manager,
                "Queue manager differs from naming convention"
            );
        }
        self.queue_manager = details.queue_manager;
        Ok(details.availability)
    }
}

/// Derive the owning queue manager from an agent name.
///
/// Bridge agents (`XN?BR...`) carry their queue manager as the first dotted
/// segment, cut at the first underscore. Everything else names it in the
/// second dotted segment. Names that fit neither rule come back unchanged.
pub fn resolve_queue_manager(name: &str) -> String {
    if is_bridge_agent(name) {
        let first = name.split('.').next().unwrap_or(name);
        return first.split('_').next().unwrap_or(first).to_string();
    }

    match name.split('.').nth(1) {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => name.to_string(),
    }
}

fn is_bridge_agent(name: &str) -> bool {
    let role_end = BRIDGE_ROLE_OFFSET + BRIDGE_ROLE_TAG.len();
    name.get(..BRIDGE_SITE_TAG.len()) == Some(BRIDGE_SITE_TAG)
        && name.get(BRIDGE_ROLE_OFFSET..role_end) == Some(BRIDGE_ROLE_TAG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolCommands;
    use crate::error::DeployError;
    use crate::runner::ScriptedRunner;
    use crate::staging::StagingRepo;
    use std::rc::Rc;

    fn fleet(runner: &Rc<ScriptedRunner>) -> Fleet {
        Fleet::new(
            Box::new(Rc::clone(runner)),
            ToolCommands::default(),
            StagingRepo::new(vec![]),
        )
    }

    #[test]
    fn test_bridge_agent_uses_first_segment() {
        assert_eq!(resolve_queue_manager("XNABR01.QM1"), "XNABR01");
        assert_eq!(resolve_queue_manager("XNZBR02_EXT.SITE"), "XNZBR02");
    }

    #[test]
    fn test_default_rule_uses_second_segment() {
        assert_eq!(resolve_queue_manager("foo.QM2.bar"), "QM2");
        // Right site tag, wrong role tag
        assert_eq!(resolve_queue_manager("XNAXX01.QM3"), "QM3");
    }

    #[test]
    fn test_malformed_names_fall_through() {
        assert_eq!(resolve_queue_manager("LONELY"), "LONELY");
        assert_eq!(resolve_queue_manager("XN"), "XN");
        assert_eq!(resolve_queue_manager("TRAILING."), "TRAILING.");
        assert_eq!(resolve_queue_manager(""), "");
    }

    #[test]
    fn test_non_ascii_name_does_not_panic() {
        assert_eq!(resolve_queue_manager("XNé.QM4"), "QM4");
    }

    #[test]
    fn test_ping_uses_queue_manager() {
        let runner = Rc::new(
            ScriptedRunner::new().respond("ftePingAgent", "BFGCL0213I: responded"),
        );
        let agent = Agent::new("AG1.QMX");

        assert_eq!(agent.ping(&fleet(&runner)).unwrap(), PingReply::Responded);
        assert_eq!(runner.executed_commands(), vec!["ftePingAgent -m QMX AG1.QMX"]);
    }

    #[test]
    fn test_ping_unrecognized_output_is_unknown() {
        let runner = Rc::new(ScriptedRunner::new().respond("ftePingAgent", "garbage"));
        let agent = Agent::new("AG1.QMX");
        assert_eq!(agent.ping(&fleet(&runner)).unwrap(), PingReply::Unknown);
    }

    #[test]
    fn test_ping_tool_failure_propagates() {
        let runner = Rc::new(ScriptedRunner::new().fail("ftePingAgent", "not installed"));
        let agent = Agent::new("AG1.QMX");
        assert!(matches!(
            agent.ping(&fleet(&runner)),
            Err(DeployError::Command { .. })
        ));
    }

    #[test]
    fn test_get_status_overwrites_queue_manager() {
        let details = "\
Queue Manager Information:
    Name:       LIVEQM
Agent Availability Information:
    Status:     READY
";
        let runner = Rc::new(ScriptedRunner::new().respond("fteShowAgentDetails", details));
        let mut agent = Agent::new("AG1.QMX");

        assert_eq!(agent.get_status(&fleet(&runner)).unwrap(), "READY");
        assert_eq!(agent.queue_manager, "LIVEQM");
    }

    #[test]
    fn test_get_status_malformed_report_keeps_queue_manager() {
        let runner = Rc::new(
            ScriptedRunner::new().respond("fteShowAgentDetails", "BFGCL0014W: unknown agent"),
        );
        let mut agent = Agent::new("AG1.QMX");

        assert!(matches!(
            agent.get_status(&fleet(&runner)),
            Err(DeployError::Parse { .. })
        ));
        assert_eq!(agent.queue_manager, "QMX");
    }
}
