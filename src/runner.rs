//! Command runner abstraction for the fleet tools.
//!
//! `CommandRunner` is the seam every external invocation goes through.
//! `ProcessRunner` is the production implementation that spawns the tool directly.
//! `ScriptedRunner` is the test double that records calls and serves canned output.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::process::{Command, Stdio};
use std::rc::Rc;

use tracing::debug;

use crate::error::{DeployError, Result};

/// Trait for executing a fleet tool and capturing what it printed.
pub trait CommandRunner {
    /// Run `program` with `args` and return stdout followed by stderr.
    ///
    /// The exit status is not inspected; the fleet tools report results
    /// through message codes in their output.
    fn run(&self, program: &str, args: &[&str]) -> Result<String>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for Rc<T> {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        (**self).run(program, args)
    }
}

/// Production runner that spawns the program without a shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        debug!(program, ?args, "Running fleet tool");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| DeployError::Command {
                program: program.to_string(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&stderr);
        }

        debug!(program, exit_code = ?output.status.code(), "Fleet tool finished");
        Ok(combined)
    }
}

/// Test-double runner with per-program response queues.
///
/// Responses are served in the order they were queued. A program with nothing
/// left in its queue produces empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: RefCell<HashMap<String, VecDeque<std::result::Result<String, String>>>>,
    commands: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue output for the next invocation of `program`.
    pub fn respond(self, program: &str, output: &str) -> Self {
        self.push(program, Ok(output.to_string()));
        self
    }

    /// Queue a spawn failure for the next invocation of `program`.
    pub fn fail(self, program: &str, message: &str) -> Self {
        self.push(program, Err(message.to_string()));
        self
    }

    fn push(&self, program: &str, response: std::result::Result<String, String>) {
        self.responses
            .borrow_mut()
            .entry(program.to_string())
            .or_default()
            .push_back(response);
    }

    /// Every invocation so far, rendered as `program arg1 arg2 ...`.
    pub fn executed_commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    /// Number of times `program` was invoked.
    pub fn calls_to(&self, program: &str) -> usize {
        self.commands
            .borrow()
            .iter()
            .filter(|cmd| cmd.split_whitespace().next() == Some(program))
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let mut rendered = program.to_string();
        for arg in args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        self.commands.borrow_mut().push(rendered);

        let next = self
            .responses
            .borrow_mut()
            .get_mut(program)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => Err(DeployError::Command {
                program: program.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, message),
            }),
            None => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_runner_records_commands() {
        let runner = ScriptedRunner::new()
            .respond("fteDeployCM.sh", "ok")
            .respond("ftePingAgent", "pong");

        runner.run("fteDeployCM.sh", &["MON1"]).unwrap();
        runner.run("ftePingAgent", &["-m", "QM1", "AG1"]).unwrap();

        let cmds = runner.executed_commands();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0], "fteDeployCM.sh MON1");
        assert_eq!(cmds[1], "ftePingAgent -m QM1 AG1");
        assert_eq!(runner.calls_to("fteDeployCM.sh"), 1);
        assert_eq!(runner.calls_to("fteListMonitors"), 0);
    }

    #[test]
    fn test_scripted_runner_serves_each_program_in_order() {
        let runner = ScriptedRunner::new()
            .respond("a", "first")
            .respond("b", "other")
            .respond("a", "second");

        assert_eq!(runner.run("a", &[]).unwrap(), "first");
        assert_eq!(runner.run("a", &[]).unwrap(), "second");
        assert_eq!(runner.run("b", &[]).unwrap(), "other");
    }

    #[test]
    fn test_scripted_runner_defaults_to_empty_output() {
        let runner = ScriptedRunner::new();
        assert_eq!(runner.run("anything", &["x"]).unwrap(), "");
    }

    #[test]
    fn test_scripted_runner_failure_maps_to_command_error() {
        let runner = ScriptedRunner::new().fail("ftePingAgent", "no such file");
        let err = runner.run("ftePingAgent", &[]).unwrap_err();
        assert!(matches!(err, DeployError::Command { ref program, .. } if program == "ftePingAgent"));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_captures_stdout() {
        let output = ProcessRunner.run("echo", &["BFGCL0251I", "done"]).unwrap();
        assert_eq!(output.trim(), "BFGCL0251I done");
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_appends_stderr() {
        let output = ProcessRunner
            .run("sh", &["-c", "echo out; echo BFGCL0214I >&2; exit 3"])
            .unwrap();
        assert!(output.contains("out"));
        assert!(output.contains("BFGCL0214I"));
    }

    #[test]
    fn test_process_runner_reports_missing_program() {
        let err = ProcessRunner
            .run("definitely-not-a-fleet-tool-xyz", &[])
            .unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-fleet-tool-xyz"));
    }
}
