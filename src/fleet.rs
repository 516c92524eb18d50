//! Handle on the fleet: the tools used to reach it and the staging repository.

use crate::config::{Config, ToolCommands};
use crate::error::Result;
use crate::runner::CommandRunner;
use crate::staging::StagingRepo;

/// Everything a monitor or agent operation needs to reach the outside world.
pub struct Fleet {
    runner: Box<dyn CommandRunner>,
    tools: ToolCommands,
    staging: StagingRepo,
}

impl Fleet {
    pub fn new(runner: Box<dyn CommandRunner>, tools: ToolCommands, staging: StagingRepo) -> Self {
        Self {
            runner,
            tools,
            staging,
        }
    }

    pub fn from_config(runner: Box<dyn CommandRunner>, config: &Config) -> Self {
        Self::new(
            runner,
            config.tools.clone(),
            StagingRepo::new(config.staging_paths.clone()),
        )
    }

    pub fn staging(&self) -> &StagingRepo {
        &self.staging
    }

    /// `fteDeployCM.sh <monitor>`
    pub fn deploy(&self, monitor: &str) -> Result<String> {
        self.runner.run(&self.tools.deploy, &[monitor])
    }

    /// `fteListMonitors -v -mn <monitor> [-ma <agent>]`
    pub fn list_monitor(&self, monitor: &str, agent: Option<&str>) -> Result<String> {
        let mut args = vec!["-v", "-mn", monitor];
        if let Some(agent) = agent {
            args.extend(["-ma", agent]);
        }
        self.runner.run(&self.tools.list_monitors, &args)
    }

    /// `fteShowAgentDetails <agent>`
    pub fn agent_details(&self, agent: &str) -> Result<String> {
        self.runner.run(&self.tools.agent_details, &[agent])
    }

    /// `ftePingAgent -m <queue manager> <agent>`
    pub fn ping_agent(&self, queue_manager: &str, agent: &str) -> Result<String> {
        self.runner
            .run(&self.tools.ping_agent, &["-m", queue_manager, agent])
    }
}
