//! Configuration loading.
//!
//! Settings come from a TOML file; every key is optional and falls back to the
//! values the fleet runs with in production.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DeployError;

/// File looked up in the working directory when no `--config` is given
pub const LOCAL_CONFIG_FILE: &str = "mondeploy.toml";

const DEFAULT_STAGING_ROOT: &str = "/data/mqfte/config/fteCM/staged";
const DEFAULT_STAGING_ENVIRONMENTS: [&str; 3] = ["IT", "QSU", "PROD"];

/// Names of the fleet tools, resolved through `PATH`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolCommands {
    pub deploy: String,
    pub list_monitors: String,
    pub agent_details: String,
    pub ping_agent: String,
}

impl Default for ToolCommands {
    fn default() -> Self {
        Self {
            deploy: "fteDeployCM.sh".to_string(),
            list_monitors: "fteListMonitors".to_string(),
            agent_details: "fteShowAgentDetails".to_string(),
            ping_agent: "ftePingAgent".to_string(),
        }
    }
}

impl ToolCommands {
    /// All tool names, in invocation order of a typical deployment
    pub fn all(&self) -> [&str; 4] {
        [
            self.deploy.as_str(),
            self.list_monitors.as_str(),
            self.agent_details.as_str(),
            self.ping_agent.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Re-deploys attempted after a successful ping (command-level retry)
    pub deploy_retries: u32,
    /// Deploy-and-check rounds for a deployed but stopped monitor
    pub convergence_retries: u32,
    /// Directory receiving the batch report
    pub report_dir: PathBuf,
    /// Candidate staging directories, first existing one wins
    pub staging_paths: Vec<PathBuf>,
    pub tools: ToolCommands,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deploy_retries: 3,
            convergence_retries: 3,
            report_dir: std::env::temp_dir(),
            staging_paths: DEFAULT_STAGING_ENVIRONMENTS
                .iter()
                .map(|env| Path::new(DEFAULT_STAGING_ROOT).join(env))
                .collect(),
            tools: ToolCommands::default(),
        }
    }
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make every deployment fail
    pub fn validate(&self) -> std::result::Result<(), DeployError> {
        if self.staging_paths.is_empty() {
            return Err(DeployError::Config(
                "staging_paths must list at least one directory".to_string(),
            ));
        }
        if self.tools.all().iter().any(|tool| tool.trim().is_empty()) {
            return Err(DeployError::Config(
                "tool names must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration
///
/// # Lookup order
/// 1. `explicit` path (must exist)
/// 2. `./mondeploy.toml`
/// 3. `<config dir>/mondeploy/config.toml`
/// 4. built-in defaults
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        if !path.is_file() {
            bail!("Configuration file does not exist: {}", path.display());
        }
        return read_config(path);
    }

    for candidate in default_locations() {
        if candidate.is_file() {
            return read_config(&candidate);
        }
    }

    Ok(Config::default())
}

fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("mondeploy").join("config.toml"));
    }
    locations
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Config::from_toml(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
}
