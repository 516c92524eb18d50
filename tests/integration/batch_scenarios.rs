//! End-to-end batch runs

use chrono::Local;
use mondeploy::batch::{
    read_monitor_list, read_report, run_batch, BatchRecord, ReportWriter, RetryPolicy,
    STATUS_DEPLOYED_STOPPED, STATUS_STARTED,
};
use mondeploy::runner::ScriptedRunner;

use super::helpers::*;

const POLICY: RetryPolicy = RetryPolicy {
    deploy_retries: 3,
    convergence_retries: 2,
};

fn record(monitor: &str, status: &str) -> BatchRecord {
    BatchRecord {
        monitor: monitor.to_string(),
        status: status.to_string(),
    }
}

fn run(t: &TestFleet, list: &str) -> Vec<BatchRecord> {
    let monitors = read_monitor_list(&t.write_list(list)).unwrap();
    let report = ReportWriter::create(&t.report_dir(), Local::now()).unwrap();
    let summary = run_batch(&t.fleet, monitors, POLICY, report).unwrap();

    assert_eq!(read_report(&summary.report_path).unwrap(), summary.records);
    summary.records
}

#[test]
fn test_started_and_failed_ping() {
    let runner = ScriptedRunner::new()
        // M1
        .respond(DEPLOY, DEPLOYED)
        .respond(LIST, &listing("Started"))
        // M2
        .respond(DEPLOY, UNCONFIRMED)
        .respond(PING, PING_DOWN);
    let t = TestFleet::new(runner, &[("M1", "AG1.QMA"), ("M2", "AG2.QMB")]);

    let records = run(&t, "M1.conf\nM2.conf\n");

    assert_eq!(
        records,
        vec![record("M1", STATUS_STARTED), record("M2", "Failed Ping")]
    );
    let commands = t.runner.executed_commands();
    assert!(commands.contains(&"fteListMonitors -v -mn M1 -ma AG1.QMA".to_string()));
    assert!(commands.contains(&"ftePingAgent -m QMB AG2.QMB".to_string()));
}

#[test]
fn test_stopped_monitor_converges_after_retry() {
    let runner = ScriptedRunner::new()
        .respond(DEPLOY, DEPLOYED)
        .respond(LIST, &listing("Stopped"))
        .respond(DEPLOY, DEPLOYED)
        .respond(LIST, &listing("Started"));
    let t = TestFleet::new(runner, &[("M1", "AG1.QMA")]);

    assert_eq!(run(&t, "M1\n"), vec![record("M1", STATUS_STARTED)]);
    assert_eq!(t.runner.calls_to(DEPLOY), 2);
}

#[test]
fn test_stopped_monitor_that_never_starts() {
    let runner = ScriptedRunner::new()
        .respond(DEPLOY, DEPLOYED)
        .respond(LIST, &listing("Stopped"))
        .respond(DEPLOY, DEPLOYED)
        .respond(LIST, &listing("Stopped"))
        .respond(DEPLOY, DEPLOYED)
        .respond(LIST, &listing("Stopped"));
    let t = TestFleet::new(runner, &[("M1", "AG1.QMA")]);

    assert_eq!(run(&t, "M1.conf\n"), vec![record("M1", STATUS_DEPLOYED_STOPPED)]);
    // One initial check plus two convergence rounds
    assert_eq!(t.runner.calls_to(LIST), 3);
}

#[test]
fn test_every_outcome_gets_one_row_in_order() {
    let runner = ScriptedRunner::new()
        // A: not staged
        .respond(DEPLOY, NOT_STAGED)
        // B: agent pings but never deploys
        .respond(DEPLOY, UNCONFIRMED)
        .respond(PING, PING_OK)
        .respond(DEPLOY, UNCONFIRMED)
        .respond(DEPLOY, UNCONFIRMED)
        .respond(DEPLOY, UNCONFIRMED)
        // C: unrecognized error
        .respond(DEPLOY, "BFGCL0035E: Unable to connect")
        // D: tool missing
        .fail(DEPLOY, "No such file or directory")
        // E: deployed, no descriptor staged
        .respond(DEPLOY, DEPLOYED);
    let t = TestFleet::new(runner, &[("B", "AGB.QMB")]);

    let records = run(&t, "A.conf\nB.conf\n\nC.conf\nD.conf\nE.conf\n");

    let names: Vec<_> = records.iter().map(|r| r.monitor.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C", "D", "E"]);
    assert_eq!(records[0].status, "Not Found");
    assert_eq!(records[1].status, "Failed Command, Ping Success");
    assert_eq!(records[2].status, "New Error");
    assert!(records[3].status.contains("fteDeployCM.sh"));
    assert!(records[4].status.contains("E.xml"));
}

#[test]
fn test_partial_deploy_recovers_and_starts() {
    let runner = ScriptedRunner::new()
        .respond(DEPLOY, UNCONFIRMED)
        .respond(PING, PING_OK)
        .respond(DEPLOY, DEPLOYED)
        .respond(LIST, &listing("Started"));
    let t = TestFleet::new(runner, &[("M1", "XNABR01.QM1")]);

    assert_eq!(run(&t, "M1.conf\n"), vec![record("M1", STATUS_STARTED)]);
    assert!(t
        .runner
        .executed_commands()
        .contains(&"ftePingAgent -m XNABR01 XNABR01.QM1".to_string()));
}
