pub mod agent;
pub mod deploy;
pub mod doctor;
pub mod status;

use crate::config::Config;
use crate::fleet::Fleet;
use crate::runner::ProcessRunner;

/// Fleet handle backed by the real tools
pub fn process_fleet(config: &Config) -> Fleet {
    Fleet::from_config(Box::new(ProcessRunner), config)
}
