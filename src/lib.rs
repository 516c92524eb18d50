//! Bulk deployment and health verification of file-transfer monitors.

pub mod agent;
pub mod batch;
pub mod commands;
pub mod config;
pub mod error;
pub mod fleet;
pub mod markers;
pub mod monitor;
pub mod runner;
pub mod staging;

pub use agent::Agent;
pub use error::DeployError;
pub use fleet::Fleet;
pub use monitor::{DeployOutcome, Monitor, MonitorStatus};
