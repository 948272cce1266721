//! # Run Coordinator
//!
//! Per device: capture -> classify -> plan -> apply -> capture -> diff -> report.
//! In dry-run mode the sequence stops after planning.
//!
//! Devices run concurrently and independently. A failing device is reported in the
//! [`RunSummary`] and never stops the others.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ppsync_common::config::Config;
use ppsync_common::network::interface::InterfaceId;
use ppsync_common::network::range;
use ppsync_common::snapshot::{CapturePoint, ConfigSnapshot, MacSnapshot};
use ppsync_common::success;
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::classifier::InterfaceRecord;
use crate::device::{ArtifactSink, DeviceConnector, DeviceSession};
use crate::differ::{self, ConfigDiffReport, DiffError, MacDiffReport};
use crate::parser::{mac_table, running_config};
use crate::planner::{self, CommandSequence, PlanError, ReconciliationPlan};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{device}: connection failed")]
    Connect {
        device: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("{device}: capturing {what} failed")]
    Capture {
        device: String,
        what: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("{device}: planning failed")]
    Plan {
        device: String,
        #[source]
        source: PlanError,
    },
    #[error("{device}: applying configuration failed")]
    Execution {
        device: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("{device}: comparing snapshots failed")]
    Diff {
        device: String,
        #[source]
        source: DiffError,
    },
    /// The device task panicked or was cancelled before reporting.
    #[error("{device}: device task aborted")]
    Aborted {
        device: String,
        #[source]
        source: JoinError,
    },
}

impl RunError {
    pub fn device(&self) -> &str {
        match self {
            RunError::Connect { device, .. }
            | RunError::Capture { device, .. }
            | RunError::Plan { device, .. }
            | RunError::Execution { device, .. }
            | RunError::Diff { device, .. }
            | RunError::Aborted { device, .. } => device,
        }
    }

    /// The error and every underlying cause, joined with `: `.
    pub fn detail(&self) -> String {
        let mut text = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(e) = cause {
            text.push_str(": ");
            text.push_str(&e.to_string());
            cause = e.source();
        }
        text
    }
}

/// What happened after planning.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Nothing was sent and no post-capture was taken.
    DryRun,
    Applied(AppliedChange),
}

#[derive(Debug, Clone)]
pub struct AppliedChange {
    pub config_diff: ConfigDiffReport,
    pub mac_diff: MacDiffReport,
    /// Time spent sending the profile-definition block.
    pub profile_elapsed: Duration,
    /// Time spent sending the interface select/inherit pairs. Zero when there were none.
    pub interfaces_elapsed: Duration,
}

impl AppliedChange {
    pub fn elapsed(&self) -> Duration {
        self.profile_elapsed + self.interfaces_elapsed
    }
}

#[derive(Debug, Clone)]
pub struct DeviceReport {
    pub device: String,
    pub plan: ReconciliationPlan,
    pub commands: CommandSequence,
    pub pre_config: ConfigSnapshot,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportCounts {
    pub eligible: usize,
    pub skipped_l3: usize,
    pub already_configured: usize,
    /// Interfaces the profile was applied to. Zero in dry-run mode.
    pub newly_configured: usize,
    /// Interfaces a dry run would have configured. Zero when applied.
    pub pending: usize,
    pub config_hunks: Option<usize>,
    pub mac_hunks: Option<usize>,
}

impl DeviceReport {
    pub fn counts(&self) -> ReportCounts {
        let to_configure = self.plan.to_configure().len();
        let (newly_configured, pending, config_hunks, mac_hunks) = match &self.outcome {
            Outcome::DryRun => (0, to_configure, None, None),
            Outcome::Applied(change) => (
                to_configure,
                0,
                Some(change.config_diff.hunks().len()),
                Some(change.mac_diff.hunks().len()),
            ),
        };

        ReportCounts {
            eligible: self.plan.eligible().len(),
            skipped_l3: self.plan.skip_reasons().len(),
            already_configured: self.plan.already_configured().len(),
            newly_configured,
            pending,
            config_hunks,
            mac_hunks,
        }
    }

    pub fn applied(&self) -> Option<&AppliedChange> {
        match &self.outcome {
            Outcome::Applied(change) => Some(change),
            Outcome::DryRun => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    /// Successful devices, ordered by device id.
    pub reports: Vec<DeviceReport>,
    pub failures: Vec<RunError>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone)]
pub struct Coordinator {
    connector: Arc<dyn DeviceConnector>,
    sink: Option<Arc<dyn ArtifactSink>>,
    config: Arc<Config>,
}

impl Coordinator {
    pub fn new(connector: Arc<dyn DeviceConnector>, config: Arc<Config>) -> Self {
        Self {
            connector,
            sink: None,
            config,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ArtifactSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Runs every device concurrently and collects the results.
    pub async fn run_all(&self, devices: Vec<String>) -> RunSummary {
        let mut tasks = JoinSet::new();

        for device in devices {
            let coordinator = self.clone();
            let span = info_span!("device", %device);
            // Inner task so a panic still comes back tagged with its device.
            tasks.spawn(async move {
                let name = device.clone();
                let joined = tokio::spawn(
                    async move { coordinator.run_device(&name).await }.instrument(span),
                )
                .await;
                match joined {
                    Ok(result) => result,
                    Err(source) => Err(RunError::Aborted { device, source }),
                }
            });
        }

        let mut summary = RunSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(report)) => summary.reports.push(report),
                Ok(Err(e)) => {
                    error!("{}", e.detail());
                    summary.failures.push(e);
                }
                Err(e) => error!("Device task aborted: {e}"),
            }
        }

        summary.reports.sort_by(|a, b| a.device.cmp(&b.device));
        summary
    }

    /// Runs the full sequence against one device. The session is closed on every path.
    pub async fn run_device(&self, device: &str) -> Result<DeviceReport, RunError> {
        let mut session = self
            .connector
            .connect(device)
            .await
            .map_err(|source| RunError::Connect {
                device: device.to_string(),
                source,
            })?;

        let result = self.reconcile(device, session.as_mut()).await;

        if let Err(e) = session.close().await {
            warn!("{device}: closing session failed: {e:#}");
        }

        let report = result?;
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.persist(&report) {
                error!("{device}: writing artifacts failed: {e:#}");
            }
        }
        Ok(report)
    }

    async fn reconcile(
        &self,
        device: &str,
        session: &mut dyn DeviceSession,
    ) -> Result<DeviceReport, RunError> {
        let profile = &self.config.profile;

        let (pre_config, pre_mac) = capture(device, session, CapturePoint::Pre).await?;
        let records = interface_records(pre_config.raw_text(), profile.name());
        debug!("{device}: {} ethernet interfaces in running-config", records.len());

        let plan = planner::plan(&self.config.interfaces, &records).map_err(|source| {
            RunError::Plan {
                device: device.to_string(),
                source,
            }
        })?;
        log_plan(device, &plan);

        let commands = plan.commands(profile);

        if self.config.dry_run {
            info!(
                "{device}: dry run, {} command(s) not sent",
                commands.len()
            );
            return Ok(DeviceReport {
                device: device.to_string(),
                plan,
                commands,
                pre_config,
                outcome: Outcome::DryRun,
            });
        }

        let profile_elapsed = send_timed(device, session, &commands.definition()).await?;
        success!(
            "{device}: profile {} defined in {:.2} seconds",
            profile.name(),
            profile_elapsed.as_secs_f64()
        );

        let pairs = commands.interface_pairs();
        let interfaces_elapsed = if pairs.is_empty() {
            Duration::ZERO
        } else {
            let elapsed = send_timed(device, session, &pairs).await?;
            success!(
                "{device}: profile applied to {} interface(s) in {:.2} seconds",
                pairs.interface_selections(),
                elapsed.as_secs_f64()
            );
            elapsed
        };

        let (post_config, post_mac) = capture(device, session, CapturePoint::Post).await?;
        let diff_error = |source| RunError::Diff {
            device: device.to_string(),
            source,
        };
        let config_diff = differ::config_report(
            Some(pre_config.clone()),
            Some(post_config),
            self.config.diff_context,
        )
        .map_err(diff_error)?;
        let mac_diff = differ::mac_report(Some(pre_mac), Some(post_mac)).map_err(diff_error)?;

        info!(
            "{device}: running-config {} hunk(s), mac-table {} hunk(s)",
            config_diff.hunks().len(),
            mac_diff.hunks().len()
        );

        Ok(DeviceReport {
            device: device.to_string(),
            plan,
            commands,
            pre_config,
            outcome: Outcome::Applied(AppliedChange {
                config_diff,
                mac_diff,
                profile_elapsed,
                interfaces_elapsed,
            }),
        })
    }
}

async fn send_timed(
    device: &str,
    session: &mut dyn DeviceSession,
    commands: &CommandSequence,
) -> Result<Duration, RunError> {
    let started = Instant::now();
    session
        .send_config(commands)
        .await
        .map_err(|source| RunError::Execution {
            device: device.to_string(),
            source,
        })?;
    Ok(started.elapsed())
}

async fn capture(
    device: &str,
    session: &mut dyn DeviceSession,
    point: CapturePoint,
) -> Result<(ConfigSnapshot, MacSnapshot), RunError> {
    let capture_error = |what: &'static str| {
        move |source| RunError::Capture {
            device: device.to_string(),
            what,
            source,
        }
    };

    let config_text = session
        .running_config()
        .await
        .map_err(capture_error("running-config"))?;
    let config = ConfigSnapshot::capture(device, point, config_text);

    let mac_text = session
        .mac_table()
        .await
        .map_err(capture_error("mac address-table"))?;
    let mac = MacSnapshot::capture(device, point, mac_table::parse_mac_table(&mac_text));

    debug!(
        "{device}: {} snapshot, {} mac entries",
        point.as_str(),
        mac.entries().len()
    );
    Ok((config, mac))
}

fn interface_records(running_config: &str, profile_name: &str) -> BTreeMap<InterfaceId, InterfaceRecord> {
    running_config::interface_blocks(running_config)
        .into_iter()
        .map(|(id, block)| (id, InterfaceRecord::from_block(id, block, profile_name)))
        .collect()
}

fn log_plan(device: &str, plan: &ReconciliationPlan) {
    let summary = plan.summary();
    info!(
        "{device}: {} eligible, {} already configured, {} to configure ({})",
        plan.eligible().len(),
        plan.already_configured().len(),
        plan.to_configure().len(),
        summary.to_configure
    );
    for (id, reason) in plan.skip_reasons() {
        debug!("{device}: skipping {id} ({reason:?})");
    }
    if !plan.skip_reasons().is_empty() {
        warn!(
            "{device}: {} routed interface(s) left untouched: {}",
            plan.skip_reasons().len(),
            range::condense(plan.skip_reasons().keys().copied())
        );
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    const CONFIG: &str = "hostname leaf\ninterface Ethernet1/1\n  ip address 10.0.0.1/30\ninterface Ethernet1/2\n  switchport\n";

    #[derive(Default)]
    struct Journal {
        sent: Vec<String>,
        batches: usize,
        closed: usize,
    }

    struct StaticConnector {
        journal: Arc<Mutex<Journal>>,
        fail_send: bool,
    }

    struct StaticSession {
        journal: Arc<Mutex<Journal>>,
        fail_send: bool,
    }

    #[async_trait]
    impl DeviceConnector for StaticConnector {
        async fn connect(&self, _device: &str) -> anyhow::Result<Box<dyn DeviceSession>> {
            Ok(Box::new(StaticSession {
                journal: self.journal.clone(),
                fail_send: self.fail_send,
            }))
        }
    }

    #[async_trait]
    impl DeviceSession for StaticSession {
        async fn running_config(&mut self) -> anyhow::Result<String> {
            Ok(CONFIG.to_string())
        }

        async fn mac_table(&mut self) -> anyhow::Result<String> {
            Ok(String::new())
        }

        async fn send_config(&mut self, commands: &CommandSequence) -> anyhow::Result<()> {
            if self.fail_send {
                anyhow::bail!("% Invalid command");
            }
            let mut journal = self.journal.lock().unwrap();
            journal.sent.extend(commands.lines().iter().cloned());
            journal.batches += 1;
            Ok(())
        }

        async fn close(&mut self) -> anyhow::Result<()> {
            self.journal.lock().unwrap().closed += 1;
            Ok(())
        }
    }

    struct PanickingConnector;

    struct PanickingSession;

    #[async_trait]
    impl DeviceConnector for PanickingConnector {
        async fn connect(&self, _device: &str) -> anyhow::Result<Box<dyn DeviceSession>> {
            Ok(Box::new(PanickingSession))
        }
    }

    #[async_trait]
    impl DeviceSession for PanickingSession {
        async fn running_config(&mut self) -> anyhow::Result<String> {
            panic!("transport bug");
        }

        async fn mac_table(&mut self) -> anyhow::Result<String> {
            Ok(String::new())
        }

        async fn send_config(&mut self, _commands: &CommandSequence) -> anyhow::Result<()> {
            Ok(())
        }

        async fn close(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn coordinator(journal: Arc<Mutex<Journal>>, dry_run: bool, fail_send: bool) -> Coordinator {
        coordinator_for(journal, &[1, 2], dry_run, fail_send)
    }

    fn coordinator_for(
        journal: Arc<Mutex<Journal>>,
        ports: &[u16],
        dry_run: bool,
        fail_send: bool,
    ) -> Coordinator {
        let interfaces: BTreeSet<InterfaceId> =
            ports.iter().map(|p| InterfaceId::new(1, *p)).collect();
        let config = Config::new(interfaces).with_dry_run(dry_run);
        Coordinator::new(
            Arc::new(StaticConnector { journal, fail_send }),
            Arc::new(config),
        )
    }

    #[tokio::test]
    async fn dry_run_sends_nothing() {
        let journal = Arc::new(Mutex::new(Journal::default()));
        let report = coordinator(journal.clone(), true, false)
            .run_device("leaf")
            .await
            .unwrap();

        assert!(matches!(report.outcome, Outcome::DryRun));
        assert_eq!(report.counts().pending, 1);
        assert_eq!(report.counts().skipped_l3, 1);
        assert!(journal.lock().unwrap().sent.is_empty());
        assert_eq!(journal.lock().unwrap().closed, 1);
    }

    #[tokio::test]
    async fn execution_failure_still_closes_session() {
        let journal = Arc::new(Mutex::new(Journal::default()));
        let err = coordinator(journal.clone(), false, true)
            .run_device("leaf")
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Execution { .. }));
        assert_eq!(err.device(), "leaf");
        assert_eq!(
            err.detail(),
            "leaf: applying configuration failed: % Invalid command"
        );
        assert_eq!(journal.lock().unwrap().closed, 1);
    }

    #[tokio::test]
    async fn definition_and_interfaces_are_sent_and_timed_separately() {
        let journal = Arc::new(Mutex::new(Journal::default()));
        let report = coordinator(journal.clone(), false, false)
            .run_device("leaf")
            .await
            .unwrap();

        let change = report.applied().unwrap();
        assert_eq!(change.elapsed(), change.profile_elapsed + change.interfaces_elapsed);
        assert_eq!(journal.lock().unwrap().batches, 2);
        assert_eq!(journal.lock().unwrap().sent, report.commands.lines());
    }

    #[tokio::test]
    async fn nothing_to_configure_sends_only_the_definition() {
        let journal = Arc::new(Mutex::new(Journal::default()));
        let report = coordinator_for(journal.clone(), &[1], false, false)
            .run_device("leaf")
            .await
            .unwrap();

        let change = report.applied().unwrap();
        assert_eq!(change.interfaces_elapsed, Duration::ZERO);
        assert_eq!(journal.lock().unwrap().batches, 1);
    }

    #[tokio::test]
    async fn panicking_device_is_reported_as_failure() {
        let coordinator = Coordinator::new(
            Arc::new(PanickingConnector),
            Arc::new(Config::new([InterfaceId::new(1, 1)].into_iter().collect())),
        );

        let summary = coordinator
            .run_all(vec!["leaf-b".to_string(), "leaf-a".to_string()])
            .await;

        assert!(!summary.is_success());
        assert!(summary.reports.is_empty());
        let mut failed: Vec<&str> = summary.failures.iter().map(RunError::device).collect();
        failed.sort();
        assert_eq!(failed, ["leaf-a", "leaf-b"]);
        assert!(summary
            .failures
            .iter()
            .all(|e| matches!(e, RunError::Aborted { .. })));
    }

    #[test]
    fn records_cover_every_ethernet_block() {
        let records = interface_records(CONFIG, "BAREMETAL");
        assert_eq!(records.len(), 2);
        assert!(records[&InterfaceId::new(1, 1)].is_l3());
        assert!(!records[&InterfaceId::new(1, 2)].is_l3());
    }
}
