use ppsync_common::network::mac::{self, MacTableEntry};

#[derive(Debug, PartialEq, Eq)]
enum MacLine {
    Entry(MacTableEntry),
    Separator,
    Ignored,
}

impl MacLine {
    /// Reads one row such as `*  100  0050.56a1.b2c3  dynamic  0  F  F  Eth1/5`.
    ///
    /// Rows are anchored on the dotted MAC: the VLAN is the token before it and the port
    /// is the last token, so leading entry flags (`*`, `G`, `+`) need no special casing.
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.starts_with('-') && trimmed.contains('+') {
            return MacLine::Separator;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let Some(mac_idx) = tokens.iter().position(|t| mac::parse_dotted(t).is_some()) else {
            return MacLine::Ignored;
        };
        let (Some(mac), Some(vlan_str), Some(interface)) = (
            mac::parse_dotted(tokens[mac_idx]),
            mac_idx.checked_sub(1).map(|idx| tokens[idx]),
            tokens.last().filter(|_| tokens.len() > mac_idx + 1),
        ) else {
            return MacLine::Ignored;
        };

        let vlan = match vlan_str {
            "-" => None,
            other => match other.parse::<u16>() {
                Ok(vlan) => Some(vlan),
                Err(_) => return MacLine::Ignored,
            },
        };

        MacLine::Entry(MacTableEntry::new(mac, vlan, *interface))
    }
}

/// Parses `show mac address-table` output, keeping the device's row order.
///
/// When the header separator is present only rows after it are read; unrecognized rows
/// are skipped.
pub fn parse_mac_table(output: &str) -> Vec<MacTableEntry> {
    let lines: Vec<MacLine> = output.lines().map(MacLine::parse).collect();
    let start = lines
        .iter()
        .position(|l| *l == MacLine::Separator)
        .map(|idx| idx + 1)
        .unwrap_or(0);

    lines
        .into_iter()
        .skip(start)
        .filter_map(|line| match line {
            MacLine::Entry(entry) => Some(entry),
            _ => None,
        })
        .collect()
}
