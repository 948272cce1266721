use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use ppsync_core::coordinator::DeviceReport;
use ppsync_core::device::ArtifactSink;
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Writes each device report under `<root>/<device>/<run timestamp>/`.
pub struct FsArtifactSink {
    root: PathBuf,
}

impl FsArtifactSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn run_dir(&self, report: &DeviceReport) -> PathBuf {
        let device: String = report
            .device
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        let stamp = report.pre_config.timestamp().format(TIMESTAMP_FORMAT).to_string();
        self.root.join(device).join(stamp)
    }
}

fn write(dir: &Path, name: &str, contents: &str) -> anyhow::Result<()> {
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))
}

fn summary_text(report: &DeviceReport) -> String {
    let counts = report.counts();
    let mut text = String::new();

    let _ = writeln!(text, "device: {}", report.device);
    let _ = writeln!(text, "captured: {}", report.pre_config.timestamp().to_rfc3339());
    let _ = writeln!(text);
    text.push_str(&report.plan.summary().to_string());
    let _ = writeln!(text);
    let _ = writeln!(text, "newly-configured: {}", counts.newly_configured);
    let _ = writeln!(text, "pending: {}", counts.pending);
    if let Some(change) = report.applied() {
        let _ = writeln!(
            text,
            "profile-definition seconds: {:.2}",
            change.profile_elapsed.as_secs_f64()
        );
        let _ = writeln!(
            text,
            "interface-application seconds: {:.2}",
            change.interfaces_elapsed.as_secs_f64()
        );
    }
    if let (Some(config), Some(mac)) = (counts.config_hunks, counts.mac_hunks) {
        let _ = writeln!(text, "running-config hunks: {config}");
        let _ = writeln!(text, "mac-table hunks: {mac}");
    }
    let _ = writeln!(text);
    let _ = writeln!(text, "commands:");
    text.push_str(&report.commands.to_string());
    text
}

impl ArtifactSink for FsArtifactSink {
    fn persist(&self, report: &DeviceReport) -> anyhow::Result<()> {
        let dir = self.run_dir(report);
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

        write(&dir, "summary.txt", &summary_text(report))?;
        write(&dir, "pre-running-config.txt", report.pre_config.raw_text())?;

        if let Some(change) = report.applied() {
            write(&dir, "post-running-config.txt", change.config_diff.after().raw_text())?;
            write(&dir, "running-config.diff", &change.config_diff.to_unified())?;
            write(&dir, "mac-table.diff", &change.mac_diff.to_unified())?;
        }

        debug!("{}: artifacts written to {}", report.device, dir.display());
        Ok(())
    }
}
