//! Shared fixtures: a temporary staging repo and a fleet over scripted tools.

use mondeploy::config::ToolCommands;
use mondeploy::runner::ScriptedRunner;
use mondeploy::staging::StagingRepo;
use mondeploy::Fleet;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tempfile::TempDir;

pub const DEPLOY: &str = "fteDeployCM.sh";
pub const LIST: &str = "fteListMonitors";
pub const PING: &str = "ftePingAgent";

pub const DEPLOYED: &str = "BFGCL0251I: The request to deploy the monitor was accepted.";
pub const UNCONFIRMED: &str = "BFGCL0253W: No acknowledgement received from the agent.";
pub const NOT_STAGED: &str = "Monitor not found! Maybe not staged?";
pub const PING_OK: &str = "BFGCL0213I: agent responded to ping in 0.1 seconds.";
pub const PING_DOWN: &str = "BFGCL0214I: agent didn't respond to ping after 5 seconds.";

pub fn listing(status: &str) -> String {
    format!("Monitor Information:\n    Name: MON\n    Status: {status}\n")
}

pub struct TestFleet {
    pub runner: Rc<ScriptedRunner>,
    pub fleet: Fleet,
    pub dir: TempDir,
}

impl TestFleet {
    /// Staging descriptors for `(monitor, agent)` pairs plus a fleet over `runner`
    pub fn new(runner: ScriptedRunner, staged: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        let staging = dir.path().join("staged").join("QSU");
        fs::create_dir_all(&staging).unwrap();

        for (monitor, agent) in staged {
            fs::write(
                staging.join(format!("{monitor}.xml")),
                format!("<monitor><name>{monitor}</name><agent>{agent}</agent></monitor>"),
            )
            .unwrap();
        }

        let runner = Rc::new(runner);
        let fleet = Fleet::new(
            Box::new(Rc::clone(&runner)),
            ToolCommands::default(),
            StagingRepo::new(vec![dir.path().join("staged").join("IT"), staging]),
        );
        Self { runner, fleet, dir }
    }

    pub fn write_list(&self, content: &str) -> PathBuf {
        let path = self.dir.path().join("monitors.txt");
        fs::write(&path, content).unwrap();
        path
    }

    pub fn report_dir(&self) -> PathBuf {
        self.dir.path().join("reports")
    }
}
