//! Scripted in-memory switches for driving the coordinator without a network.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ppsync_core::device::{DeviceConnector, DeviceSession};
use ppsync_core::planner::CommandSequence;

pub const MAC_HEADER: &str = "\
Legend:
        * - primary entry, G - Gateway MAC, (R) - Routed MAC, O - Overlay MAC
   VLAN     MAC Address      Type      age     Secure NTFY Ports
---------+-----------------+--------+---------+------+----+------------------
";

/// What one device reports before and after configuration is sent.
#[derive(Clone, Default)]
pub struct DeviceScript {
    pub pre_config: String,
    pub post_config: String,
    pub pre_mac: String,
    pub post_mac: String,
    pub refuse_connect: bool,
    pub reject_config: bool,
}

#[derive(Default, Debug)]
pub struct DeviceLog {
    pub sent: Vec<String>,
    pub config_reads: usize,
    pub mac_reads: usize,
    pub closed: usize,
}

#[derive(Clone, Default)]
pub struct ScriptedConnector {
    scripts: Arc<BTreeMap<String, DeviceScript>>,
    logs: Arc<Mutex<BTreeMap<String, DeviceLog>>>,
}

impl ScriptedConnector {
    pub fn new(scripts: impl IntoIterator<Item = (&'static str, DeviceScript)>) -> Self {
        Self {
            scripts: Arc::new(
                scripts
                    .into_iter()
                    .map(|(name, script)| (name.to_string(), script))
                    .collect(),
            ),
            logs: Arc::default(),
        }
    }

    pub fn log<R>(&self, device: &str, read: impl FnOnce(&DeviceLog) -> R) -> R {
        let logs = self.logs.lock().unwrap();
        let empty = DeviceLog::default();
        read(logs.get(device).unwrap_or(&empty))
    }
}

#[async_trait]
impl DeviceConnector for ScriptedConnector {
    async fn connect(&self, device: &str) -> anyhow::Result<Box<dyn DeviceSession>> {
        let Some(script) = self.scripts.get(device) else {
            anyhow::bail!("unknown host {device}");
        };
        if script.refuse_connect {
            anyhow::bail!("connection refused");
        }
        Ok(Box::new(ScriptedSession {
            device: device.to_string(),
            script: script.clone(),
            logs: self.logs.clone(),
            applied: false,
        }))
    }
}

struct ScriptedSession {
    device: String,
    script: DeviceScript,
    logs: Arc<Mutex<BTreeMap<String, DeviceLog>>>,
    applied: bool,
}

impl ScriptedSession {
    fn record(&self, write: impl FnOnce(&mut DeviceLog)) {
        let mut logs = self.logs.lock().unwrap();
        write(logs.entry(self.device.clone()).or_default());
    }
}

#[async_trait]
impl DeviceSession for ScriptedSession {
    async fn running_config(&mut self) -> anyhow::Result<String> {
        self.record(|log| log.config_reads += 1);
        Ok(if self.applied {
            self.script.post_config.clone()
        } else {
            self.script.pre_config.clone()
        })
    }

    async fn mac_table(&mut self) -> anyhow::Result<String> {
        self.record(|log| log.mac_reads += 1);
        Ok(if self.applied {
            self.script.post_mac.clone()
        } else {
            self.script.pre_mac.clone()
        })
    }

    async fn send_config(&mut self, commands: &CommandSequence) -> anyhow::Result<()> {
        if self.script.reject_config {
            anyhow::bail!("% Invalid command at '^' marker.");
        }
        self.record(|log| log.sent.extend(commands.lines().iter().cloned()));
        self.applied = true;
        Ok(())
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.record(|log| log.closed += 1);
        Ok(())
    }
}

/// A 46-port leaf: 1/1 routed, 1/2 already on the profile, the rest plain L2.
pub fn leaf_config() -> String {
    let mut text = String::from("!Command: show running-config\nversion 9.3(8)\nhostname leaf\n\n");
    for port in 1..=46 {
        text.push_str(&format!("interface Ethernet1/{port}\n"));
        match port {
            1 => text.push_str("  no switchport\n  ip address 10.0.0.1/30\n  no shutdown\n"),
            2 => text.push_str("  inherit port-profile BAREMETAL\n"),
            _ => text.push_str("  switchport\n"),
        }
        text.push('\n');
    }
    text.push_str("interface mgmt0\n  vrf member management\n  ip address 192.0.2.10/24\n");
    text
}

/// [`leaf_config`] after the profile was applied to 1/3-46.
pub fn leaf_config_applied() -> String {
    leaf_config().replace("  switchport\n", "  switchport\n  inherit port-profile BAREMETAL\n")
}

pub fn mac_table(rows: &[(&str, &str, &str)]) -> String {
    let mut text = String::from(MAC_HEADER);
    for (vlan, mac, port) in rows {
        text.push_str(&format!("*   {vlan:<6} {mac}   dynamic  0         F      F    {port}\n"));
    }
    text
}

pub fn leaf_script() -> DeviceScript {
    DeviceScript {
        pre_config: leaf_config(),
        post_config: leaf_config_applied(),
        pre_mac: mac_table(&[
            ("10", "0050.5600.0001", "Eth1/3"),
            ("10", "0050.5600.0002", "Eth1/4"),
        ]),
        post_mac: mac_table(&[
            ("10", "0050.5600.0001", "Eth1/3"),
            ("10", "0050.5600.0003", "Eth1/5"),
        ]),
        ..DeviceScript::default()
    }
}
