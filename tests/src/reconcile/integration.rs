#![cfg(test)]
use std::collections::BTreeSet;
use std::sync::Arc;

use ppsync_common::config::Config;
use ppsync_common::network::interface::InterfaceId;
use ppsync_common::network::range;
use ppsync_common::profile::ProfileDefinition;
use ppsync_core::coordinator::{Coordinator, Outcome, RunError};
use ppsync_core::planner::PlanError;

use crate::support::{DeviceScript, ScriptedConnector, leaf_config_applied, leaf_script};

fn full_range() -> BTreeSet<InterfaceId> {
    range::expand_set("1/1-46").unwrap()
}

fn coordinator(connector: &ScriptedConnector, config: Config) -> Coordinator {
    Coordinator::new(Arc::new(connector.clone()), Arc::new(config))
}

/// 1/1 is routed, 1/2 already inherits BAREMETAL, 1/3-46 get the profile.
#[tokio::test]
async fn leaf_is_reconciled_end_to_end() {
    let connector = ScriptedConnector::new([("leaf1", leaf_script())]);
    let report = coordinator(&connector, Config::new(full_range()))
        .run_device("leaf1")
        .await
        .unwrap();

    let summary = report.plan.summary();
    assert_eq!(summary.to_configure, "1/3-46");
    assert_eq!(summary.skipped_l3, "1/1");
    assert_eq!(summary.already_configured, "1/2");

    let definition = ProfileDefinition::baremetal().definition_commands();
    assert_eq!(report.commands.len(), definition.len() + 44 * 2);
    assert_eq!(report.commands.interface_selections(), 44);

    let counts = report.counts();
    assert_eq!(counts.eligible, 45);
    assert_eq!(counts.skipped_l3, 1);
    assert_eq!(counts.already_configured, 1);
    assert_eq!(counts.newly_configured, 44);
    assert_eq!(counts.pending, 0);

    let sent = connector.log("leaf1", |log| log.sent.clone());
    assert_eq!(sent, report.commands.lines());
    assert_eq!(connector.log("leaf1", |log| log.config_reads), 2);
    assert_eq!(connector.log("leaf1", |log| log.closed), 1);
}

#[tokio::test]
async fn applied_run_diffs_config_and_mac_table() {
    let connector = ScriptedConnector::new([("leaf1", leaf_script())]);
    let report = coordinator(&connector, Config::new(full_range()))
        .run_device("leaf1")
        .await
        .unwrap();

    let Outcome::Applied(change) = &report.outcome else {
        panic!("expected an applied outcome");
    };

    assert!(change.config_diff.changed());
    let added: Vec<&str> = change
        .config_diff
        .hunks()
        .iter()
        .flat_map(|h| h.added())
        .collect();
    assert_eq!(added.len(), 44);
    assert!(added.iter().all(|line| line.trim() == "inherit port-profile BAREMETAL"));
    assert_eq!(
        change.config_diff.hunks().iter().flat_map(|h| h.removed()).count(),
        0
    );

    let macs = change.mac_diff.mac_changes();
    assert_eq!(macs.added.len(), 1);
    assert_eq!(macs.removed.len(), 1);
    assert_eq!(macs.unchanged, 1);
    assert_eq!(report.counts().mac_hunks, Some(change.mac_diff.hunks().len()));
    assert!(change.mac_diff.changed());
}

#[tokio::test]
async fn dry_run_skips_transmission_and_post_capture() {
    let connector = ScriptedConnector::new([("leaf1", leaf_script())]);
    let config = Config::new(full_range()).with_dry_run(true);
    let report = coordinator(&connector, config).run_device("leaf1").await.unwrap();

    assert!(matches!(report.outcome, Outcome::DryRun));
    assert_eq!(report.counts().pending, 44);
    assert_eq!(report.counts().newly_configured, 0);
    assert_eq!(report.counts().config_hunks, None);
    assert_eq!(report.commands.interface_selections(), 44);

    assert!(connector.log("leaf1", |log| log.sent.is_empty()));
    assert_eq!(connector.log("leaf1", |log| log.config_reads), 1);
    assert_eq!(connector.log("leaf1", |log| log.closed), 1);
}

#[tokio::test]
async fn rerun_on_reconciled_device_changes_nothing() {
    let reconciled = leaf_config_applied();
    let mac = leaf_script().post_mac;
    let script = DeviceScript {
        pre_config: reconciled.clone(),
        post_config: reconciled,
        pre_mac: mac.clone(),
        post_mac: mac,
        ..DeviceScript::default()
    };
    let connector = ScriptedConnector::new([("leaf1", script)]);
    let report = coordinator(&connector, Config::new(full_range()))
        .run_device("leaf1")
        .await
        .unwrap();

    assert!(report.plan.is_noop());
    assert_eq!(report.plan.already_configured(), report.plan.eligible());
    assert_eq!(report.commands.interface_selections(), 0);

    let change = report.applied().unwrap();
    assert!(!change.config_diff.changed());
    assert!(!change.mac_diff.changed());
    assert_eq!(report.counts().config_hunks, Some(0));
}

#[tokio::test]
async fn failing_devices_do_not_stop_the_others() {
    let refused = DeviceScript {
        refuse_connect: true,
        ..leaf_script()
    };
    let rejected = DeviceScript {
        reject_config: true,
        ..leaf_script()
    };
    let connector = ScriptedConnector::new([
        ("leaf1", leaf_script()),
        ("leaf2", refused),
        ("leaf3", rejected),
        ("leaf4", leaf_script()),
    ]);

    let summary = coordinator(&connector, Config::new(full_range()))
        .run_all(["leaf4", "leaf3", "leaf2", "leaf1"].map(String::from).to_vec())
        .await;

    assert!(!summary.is_success());
    let succeeded: Vec<&str> = summary.reports.iter().map(|r| r.device.as_str()).collect();
    assert_eq!(succeeded, ["leaf1", "leaf4"]);

    let mut failed: Vec<&str> = summary.failures.iter().map(RunError::device).collect();
    failed.sort();
    assert_eq!(failed, ["leaf2", "leaf3"]);
    assert!(summary.failures.iter().any(|e| matches!(e, RunError::Connect { .. })));
    assert!(summary.failures.iter().any(|e| matches!(e, RunError::Execution { .. })));

    assert_eq!(connector.log("leaf3", |log| log.closed), 1);
    assert_eq!(connector.log("leaf3", |log| log.config_reads), 1);
}

#[tokio::test]
async fn missing_interfaces_abort_the_device_before_sending() {
    let connector = ScriptedConnector::new([("leaf1", leaf_script())]);
    let config = Config::new(range::expand_set("1/45-48").unwrap());

    let err = coordinator(&connector, config).run_device("leaf1").await.unwrap_err();

    match &err {
        RunError::Plan { source, .. } => assert_eq!(
            *source,
            PlanError::MissingInterfaceRecord {
                missing: range::expand_set("1/47-48").unwrap()
            }
        ),
        other => panic!("expected a planning error, got {other:?}"),
    }
    assert_eq!(
        err.detail(),
        "leaf1: planning failed: device did not report interface(s) 1/47-48"
    );
    assert!(connector.log("leaf1", |log| log.sent.is_empty()));
    assert_eq!(connector.log("leaf1", |log| log.closed), 1);
}
