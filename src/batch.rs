//! Bulk deployment from a monitor list, with a per-monitor report.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::fleet::Fleet;
use crate::monitor::Monitor;

pub const REPORT_HEADER: &str = "Monitor : DeployStatus";
pub const REPORT_SEPARATOR: &str = " : ";

pub const STATUS_STARTED: &str = "Started";
pub const STATUS_DEPLOYED_STOPPED: &str = "Monitor Deployed but Stopped";

const REPORT_PREFIX: &str = "ListDeploy_";
const REPORT_TIMESTAMP: &str = "%d%m%Y_%H%M%S";

/// Retry caps for a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-deploys after a successful ping
    pub deploy_retries: u32,
    /// Deploy-and-check rounds for a deployed but stopped monitor
    pub convergence_retries: u32,
}

/// One report row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRecord {
    pub monitor: String,
    pub status: String,
}

impl BatchRecord {
    pub fn is_started(&self) -> bool {
        self.status == STATUS_STARTED
    }
}

#[derive(Debug)]
pub struct BatchSummary {
    pub records: Vec<BatchRecord>,
    pub report_path: PathBuf,
}

impl BatchSummary {
    pub fn started_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_started()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.records.len() - self.started_count()
    }
}

/// Read monitor names from a list file, one per line
pub fn read_monitor_list(path: &Path) -> Result<Vec<Monitor>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read monitor list: {}", path.display()))?;
    Ok(parse_monitor_list(&content))
}

/// Parse list content, skipping blank lines
pub fn parse_monitor_list(content: &str) -> Vec<Monitor> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(Monitor::from_list_entry)
        .collect()
}

/// Report file opened once per batch and appended to in processing order
pub struct ReportWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ReportWriter {
    /// Create a report named after `now` inside `dir`.
    ///
    /// An existing report with the same timestamp is never overwritten; a
    /// numeric suffix is appended instead.
    pub fn create(dir: &Path, now: DateTime<Local>) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create report directory: {}", dir.display()))?;

        let stem = format!("{REPORT_PREFIX}{}", now.format(REPORT_TIMESTAMP));
        let mut suffix = 0u32;
        loop {
            let name = if suffix == 0 {
                format!("{stem}.csv")
            } else {
                format!("{stem}_{suffix}.csv")
            };
            let path = dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    let mut report = Self {
                        path,
                        writer: BufWriter::new(file),
                    };
                    report.write_line(REPORT_HEADER)?;
                    return Ok(report);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to create report: {}", path.display())
                    })
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row and flush it to disk
    pub fn record(&mut self, record: &BatchRecord) -> Result<()> {
        self.write_line(&format!(
            "{}{REPORT_SEPARATOR}{}",
            record.monitor, record.status
        ))
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{line}")
            .and_then(|_| self.writer.flush())
            .with_context(|| format!("Failed to write report: {}", self.path.display()))
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to write report: {}", self.path.display()))?;
        Ok(self.path)
    }
}

/// Read a report back into its rows.
///
/// Rows split on the last separator, so monitor names may contain it.
pub fn read_report(path: &Path) -> Result<Vec<BatchRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read report: {}", path.display()))?;

    let mut lines = content.lines();
    match lines.next() {
        Some(REPORT_HEADER) => {}
        other => anyhow::bail!(
            "Report {} has unexpected header: {:?}",
            path.display(),
            other
        ),
    }

    lines
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.rsplit_once(REPORT_SEPARATOR)
                .map(|(monitor, status)| BatchRecord {
                    monitor: monitor.to_string(),
                    status: status.to_string(),
                })
                .with_context(|| format!("Malformed report row: {line}"))
        })
        .collect()
}

/// Drive one monitor through deploy, verification and convergence retry.
///
/// Never fails: every problem ends up in the returned status text.
pub fn process_monitor(fleet: &Fleet, monitor: &mut Monitor, policy: RetryPolicy) -> String {
    let outcome = match monitor.deploy(fleet, policy.deploy_retries) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(monitor = %monitor.name, error = %e, "Deployment aborted");
            return e.to_string();
        }
    };
    if !outcome.is_success() {
        return outcome.label().to_string();
    }

    let agent = match monitor.get_agent(fleet) {
        Ok(agent) => agent,
        Err(e) => {
            error!(monitor = %monitor.name, error = %e, "Cannot resolve agent");
            return e.to_string();
        }
    };

    match monitor.check_status_on(fleet, &agent.name) {
        Ok(status) if status.is_started() => {
            info!(monitor = %monitor.name, "Monitor is now started");
            return STATUS_STARTED.to_string();
        }
        Ok(_) => {}
        Err(e) => error!(monitor = %monitor.name, error = %e, "Status check failed"),
    }

    if monitor.retry(fleet, policy.convergence_retries, &agent.name) {
        STATUS_STARTED.to_string()
    } else {
        STATUS_DEPLOYED_STOPPED.to_string()
    }
}

/// Process every monitor in order, writing one report row per monitor
pub fn run_batch(
    fleet: &Fleet,
    monitors: Vec<Monitor>,
    policy: RetryPolicy,
    mut report: ReportWriter,
) -> Result<BatchSummary> {
    let total = monitors.len();
    let mut records = Vec::with_capacity(total);

    for (index, mut monitor) in monitors.into_iter().enumerate() {
        info!(monitor = %monitor.name, "[{}/{}] Processing monitor", index + 1, total);
        let status = process_monitor(fleet, &mut monitor, policy);

        let record = BatchRecord {
            monitor: monitor.name,
            status,
        };
        report.record(&record)?;
        records.push(record);
    }

    let report_path = report.finish()?;
    Ok(BatchSummary {
        records,
        report_path,
    })
}
