use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use mac_oui::Oui;
use pnet::util::MacAddr;
use tracing::warn;

static OUI_DB: OnceLock<Option<Oui>> = OnceLock::new();

/// One row of a switch's MAC address table.
///
/// Two entries are the same fact when `(mac, vlan, interface)` match;
/// learning type and age are not part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacTableEntry {
    pub mac: MacAddr,
    /// `None` for entries the switch reports without a VLAN (`-`).
    pub vlan: Option<u16>,
    pub interface: String,
}

impl MacTableEntry {
    pub fn new(mac: MacAddr, vlan: Option<u16>, interface: impl Into<String>) -> Self {
        Self {
            mac,
            vlan,
            interface: interface.into(),
        }
    }

    fn sort_key(&self) -> ([u8; 6], Option<u16>, &str) {
        let m = self.mac;
        ([m.0, m.1, m.2, m.3, m.4, m.5], self.vlan, self.interface.as_str())
    }
}

impl Ord for MacTableEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for MacTableEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MacTableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vlan = self
            .vlan
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(f, "{:<6} {}  {}", vlan, to_dotted(self.mac), self.interface)
    }
}

/// Parses the Cisco dotted notation `0050.56a1.b2c3`.
pub fn parse_dotted(s: &str) -> Option<MacAddr> {
    let groups: Vec<&str> = s.split('.').collect();
    if groups.len() != 3 || groups.iter().any(|g| g.len() != 4) {
        return None;
    }

    let mut octets = [0u8; 6];
    for (idx, group) in groups.iter().enumerate() {
        let value = u16::from_str_radix(group, 16).ok()?;
        let [hi, lo] = value.to_be_bytes();
        octets[idx * 2] = hi;
        octets[idx * 2 + 1] = lo;
    }

    let [a, b, c, d, e, f] = octets;
    Some(MacAddr::new(a, b, c, d, e, f))
}

/// Renders a MAC in the Cisco dotted notation.
pub fn to_dotted(mac: MacAddr) -> String {
    format!(
        "{:02x}{:02x}.{:02x}{:02x}.{:02x}{:02x}",
        mac.0, mac.1, mac.2, mac.3, mac.4, mac.5
    )
}

/// Retrieves or initializes the **Organizationally unique identifier** database.
fn get_oui_db() -> Option<&'static Oui> {
    OUI_DB
        .get_or_init(|| match Oui::default() {
            Ok(db) => Some(db),
            Err(e) => {
                warn!("OUI database unavailable, vendors will not be shown: {e:?}");
                None
            }
        })
        .as_ref()
}

/// Identify the vendor of a MAC address.
pub fn get_vendor(mac: MacAddr) -> Option<String> {
    let db = get_oui_db()?;
    let mac_str = mac.to_string();
    match db.lookup_by_mac(&mac_str) {
        Ok(Some(entry)) => Some(entry.company_name.clone()),
        _ => None,
    }
}
