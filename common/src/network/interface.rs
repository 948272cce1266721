//! # Switch Interface Identifiers
//!
//! A physical switch port is addressed by its `module/port` pair, e.g. `Ethernet1/5`.
//!
//! Accepted spellings when parsing:
//! * Bare pair: `1/5`
//! * Abbreviated: `Eth1/5`
//! * Full: `Ethernet1/5` (case-insensitive)

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const FULL_PREFIX: &str = "ethernet";
const SHORT_PREFIX: &str = "eth";

/// Identifies one physical interface on a switch.
///
/// Ordering is by `(module, port)`, which is what every rendered list relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceId {
    module: u16,
    port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseInterfaceError {
    #[error("'{0}' is not a module/port pair")]
    NotAPair(String),
    #[error("invalid number '{value}' in interface '{input}'")]
    InvalidNumber { input: String, value: String },
}

impl InterfaceId {
    pub const fn new(module: u16, port: u16) -> Self {
        Self { module, port }
    }

    pub fn module(&self) -> u16 {
        self.module
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `module/port` without the media prefix, as used in condensed ranges.
    pub fn short(&self) -> String {
        format!("{}/{}", self.module, self.port)
    }

    /// The next port on the same module, if it exists.
    pub fn successor(&self) -> Option<Self> {
        self.port.checked_add(1).map(|port| Self::new(self.module, port))
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ethernet{}/{}", self.module, self.port)
    }
}

impl FromStr for InterfaceId {
    type Err = ParseInterfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pair = strip_media_prefix(s.trim());
        let Some((module_str, port_str)) = pair.split_once('/') else {
            return Err(ParseInterfaceError::NotAPair(s.to_string()));
        };

        let module = parse_number(module_str, s)?;
        let port = parse_number(port_str, s)?;

        Ok(Self::new(module, port))
    }
}

/// Removes a leading `Ethernet`/`Eth` prefix, leaving the `module/port` part.
pub fn strip_media_prefix(s: &str) -> &str {
    let lower = s.to_ascii_lowercase();
    if lower.starts_with(FULL_PREFIX) {
        &s[FULL_PREFIX.len()..]
    } else if lower.starts_with(SHORT_PREFIX) {
        &s[SHORT_PREFIX.len()..]
    } else {
        s
    }
}

fn parse_number(value: &str, input: &str) -> Result<u16, ParseInterfaceError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|_| ParseInterfaceError::InvalidNumber {
            input: input.to_string(),
            value: value.to_string(),
        })
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

    #[test]
    fn parse_accepts_all_spellings() {
        let expected = InterfaceId::new(1, 5);
        assert_eq!("1/5".parse::<InterfaceId>().unwrap(), expected);
        assert_eq!("Eth1/5".parse::<InterfaceId>().unwrap(), expected);
        assert_eq!("Ethernet1/5".parse::<InterfaceId>().unwrap(), expected);
        assert_eq!("ETHERNET1/5".parse::<InterfaceId>().unwrap(), expected);
        assert_eq!("  ethernet1/5 ".parse::<InterfaceId>().unwrap(), expected);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            "mgmt0".parse::<InterfaceId>(),
            Err(ParseInterfaceError::NotAPair(_))
        ));
        assert!(matches!(
            "1/x".parse::<InterfaceId>(),
            Err(ParseInterfaceError::InvalidNumber { .. })
        ));
        assert!("Vlan10".parse::<InterfaceId>().is_err());
    }

    #[test]
    fn display_uses_full_name() {
        assert_eq!(InterfaceId::new(1, 46).to_string(), "Ethernet1/46");
        assert_eq!(InterfaceId::new(2, 3).short(), "2/3");
    }

    #[test]
    fn ordering_is_module_then_port() {
        let mut ids = vec![
            InterfaceId::new(2, 1),
            InterfaceId::new(1, 10),
            InterfaceId::new(1, 2),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                InterfaceId::new(1, 2),
                InterfaceId::new(1, 10),
                InterfaceId::new(2, 1),
            ]
        );
    }

    #[test]
    fn successor_stops_at_max_port() {
        assert_eq!(InterfaceId::new(1, 1).successor(), Some(InterfaceId::new(1, 2)));
        assert_eq!(InterfaceId::new(1, u16::MAX).successor(), None);
    }
}
