//! # SSH Transport
//!
//! Talks to NX-OS switches through the system `ssh` client.
//!
//! Each session opens one multiplexing master connection (`ControlMaster`) and runs every
//! request over it, so authentication happens once per device. Password logins go through
//! `sshpass -e`; without a password the client runs in batch mode and relies on keys.
//!
//! The master is shut down by [`DeviceSession::close`], or on drop if the session is
//! abandoned.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use ppsync_core::device::{DeviceConnector, DeviceSession};
use ppsync_core::planner::CommandSequence;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::adapters::credentials::Credentials;

const SHOW_RUNNING_CONFIG: &str = "show running-config";
const SHOW_MAC_TABLE: &str = "show mac address-table";
const CONFIG_ENTER: &str = "configure terminal";
const CONFIG_LEAVE: &str = "end";
const CONNECT_TIMEOUT_SECS: u32 = 10;
/// NX-OS prefixes rejected commands with `%`.
const ERROR_MARKER: char = '%';

pub struct SshConnector {
    credentials: Arc<Credentials>,
}

impl SshConnector {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Arc::new(credentials),
        }
    }
}

#[async_trait]
impl DeviceConnector for SshConnector {
    async fn connect(&self, device: &str) -> anyhow::Result<Box<dyn DeviceSession>> {
        let mut session = SshSession {
            host: device.to_string(),
            credentials: self.credentials.clone(),
            control_path: control_path(device),
            open: false,
        };
        session.open_master().await?;
        Ok(Box::new(session))
    }
}

pub struct SshSession {
    host: String,
    credentials: Arc<Credentials>,
    control_path: PathBuf,
    open: bool,
}

fn control_path(host: &str) -> PathBuf {
    let safe_host: String = host
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    std::env::temp_dir().join(format!("ppsync-{}-{}.sock", safe_host, std::process::id()))
}

impl SshSession {
    fn base_args(&self) -> Vec<String> {
        vec![
            "-S".to_string(),
            self.control_path.display().to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={CONNECT_TIMEOUT_SECS}"),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-l".to_string(),
            self.credentials.username.clone(),
        ]
    }

    async fn open_master(&mut self) -> anyhow::Result<()> {
        let mut cmd = match &self.credentials.password {
            Some(password) => {
                let mut cmd = Command::new("sshpass");
                cmd.arg("-e").arg("ssh").env("SSHPASS", password);
                cmd
            }
            None => {
                let mut cmd = Command::new("ssh");
                cmd.args(["-o", "BatchMode=yes"]);
                cmd
            }
        };
        cmd.args(self.base_args())
            .args(["-M", "-f", "-N", "-o", "ControlPersist=yes"])
            .arg(&self.host)
            .stdin(Stdio::null());

        let output = cmd
            .output()
            .await
            .with_context(|| format!("spawning ssh for {}", self.host))?;
        if !output.status.success() {
            anyhow::bail!(
                "ssh login to {} failed: {}",
                self.host,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        self.open = true;
        debug!("{}: ssh master ready at {}", self.host, self.control_path.display());
        Ok(())
    }

    fn client(&self) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.args(self.base_args()).arg(&self.host);
        cmd
    }

    async fn exec(&self, remote_command: &str) -> anyhow::Result<String> {
        let output = self
            .client()
            .arg(remote_command)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("running '{remote_command}' on {}", self.host))?;

        if !output.status.success() {
            anyhow::bail!(
                "'{remote_command}' on {} exited with {}: {}",
                self.host,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Feeds a script to the remote CLI on stdin and returns everything it printed.
    async fn run_script(&self, script: &str) -> anyhow::Result<String> {
        let mut child = self
            .client()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawning ssh for {}", self.host))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(script.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            anyhow::bail!("config session on {} exited with {}", self.host, output.status);
        }
        Ok(text)
    }

    fn exit_master_args(&self) -> Vec<String> {
        let mut args = self.base_args();
        args.extend(["-O".to_string(), "exit".to_string(), self.host.clone()]);
        args
    }
}

fn config_script(commands: &CommandSequence) -> String {
    let mut script = format!("{CONFIG_ENTER}\n");
    for line in commands.lines() {
        script.push_str(line);
        script.push('\n');
    }
    script.push_str(CONFIG_LEAVE);
    script.push('\n');
    script
}

fn rejected_lines(output: &str) -> Vec<&str> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(ERROR_MARKER))
        .collect()
}

#[async_trait]
impl DeviceSession for SshSession {
    async fn running_config(&mut self) -> anyhow::Result<String> {
        self.exec(SHOW_RUNNING_CONFIG).await
    }

    async fn mac_table(&mut self) -> anyhow::Result<String> {
        self.exec(SHOW_MAC_TABLE).await
    }

    async fn send_config(&mut self, commands: &CommandSequence) -> anyhow::Result<()> {
        let output = self.run_script(&config_script(commands)).await?;
        let rejected = rejected_lines(&output);
        if !rejected.is_empty() {
            anyhow::bail!("device rejected configuration: {}", rejected.join("; "));
        }
        Ok(())
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;

        let output = Command::new("ssh")
            .args(self.exit_master_args())
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("closing ssh master for {}", self.host))?;
        if !output.status.success() {
            anyhow::bail!(
                "ssh master for {} did not exit cleanly: {}",
                self.host,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        if self.open {
            let _ = std::process::Command::new("ssh")
                .args(self.exit_master_args())
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppsync_common::network::interface::InterfaceId;
    use ppsync_common::profile::ProfileDefinition;
    use ppsync_core::classifier::InterfaceRecord;
    use ppsync_core::planner;
    use std::collections::{BTreeMap, BTreeSet};

    #[test]
    fn script_wraps_commands_in_config_mode() {
        let id = InterfaceId::new(1, 3);
        let records: BTreeMap<InterfaceId, InterfaceRecord> =
            [(id, InterfaceRecord::from_block(id, "", "BAREMETAL"))].into_iter().collect();
        let requested: BTreeSet<InterfaceId> = [id].into_iter().collect();
        let commands = planner::plan(&requested, &records)
            .unwrap()
            .commands(&ProfileDefinition::baremetal());

        let script = config_script(&commands);
        assert!(script.starts_with("configure terminal\nport-profile type ethernet BAREMETAL\n"));
        assert!(script.ends_with("interface Ethernet1/3\ninherit port-profile BAREMETAL\nend\n"));
    }

    #[test]
    fn percent_lines_are_rejections() {
        let output = "leaf(config)# mtu 9000\n% Invalid command at '^' marker.\nleaf(config)# end\n";
        assert_eq!(rejected_lines(output), vec!["% Invalid command at '^' marker."]);
        assert!(rejected_lines("leaf# end\n").is_empty());
    }

    #[test]
    fn control_path_is_filesystem_safe() {
        let path = control_path("fe80::1%eth0");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("ppsync-fe80__1_eth0-"));
    }
}
