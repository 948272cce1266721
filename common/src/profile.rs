//! # Port-Profile Definition
//!
//! The single profile this tool manages. Its body is fixed and never read back from a device.

pub const BAREMETAL: &str = "BAREMETAL";

const BAREMETAL_BODY: &[&str] = &[
    "mtu 9000",
    "no snmp trap link-status",
    "spanning-tree port type edge trunk",
    "state enabled",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDefinition {
    name: String,
    lines: Vec<String>,
}

impl ProfileDefinition {
    pub fn new(name: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    pub fn baremetal() -> Self {
        Self::new(
            BAREMETAL,
            BAREMETAL_BODY.iter().map(|line| line.to_string()).collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The configuration block that (re)defines the profile. Safe to send repeatedly.
    pub fn definition_commands(&self) -> Vec<String> {
        let mut cmds = Vec::with_capacity(self.lines.len() + 2);
        cmds.push(format!("port-profile type ethernet {}", self.name));
        cmds.extend(self.lines.iter().cloned());
        cmds.push("exit".to_string());
        cmds
    }

    /// The interface-level directive that attaches the profile.
    pub fn inherit_command(&self) -> String {
        format!("inherit port-profile {}", self.name)
    }
}

impl Default for ProfileDefinition {
    fn default() -> Self {
        Self::baremetal()
    }
}
