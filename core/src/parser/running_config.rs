use std::collections::BTreeMap;

use ppsync_common::network::interface::InterfaceId;

#[derive(Debug, PartialEq, Eq)]
enum ConfigLine<'a> {
    /// `interface Ethernet<m>/<p>`
    InterfaceHeader(InterfaceId),
    /// Any other line starting in column zero, including other interface kinds.
    TopLevel,
    /// An indented line belonging to the current section.
    Body(&'a str),
    Blank,
}

impl<'a> ConfigLine<'a> {
    fn parse(line: &'a str) -> Self {
        if line.trim().is_empty() {
            return ConfigLine::Blank;
        }
        if line.starts_with(char::is_whitespace) {
            return ConfigLine::Body(line);
        }

        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(keyword), Some(name), None) if keyword.eq_ignore_ascii_case("interface") => name
                .parse::<InterfaceId>()
                .map(ConfigLine::InterfaceHeader)
                .unwrap_or(ConfigLine::TopLevel),
            _ => ConfigLine::TopLevel,
        }
    }
}

/// Splits a running configuration into one block per Ethernet interface.
///
/// A block is the `interface` header plus the indented lines that follow it; it ends at
/// the next line starting in column zero. Blank lines are dropped.
pub fn interface_blocks(running_config: &str) -> BTreeMap<InterfaceId, String> {
    let mut blocks: BTreeMap<InterfaceId, String> = BTreeMap::new();
    let mut current: Option<InterfaceId> = None;

    for line in running_config.lines() {
        match ConfigLine::parse(line) {
            ConfigLine::InterfaceHeader(id) => {
                let block = blocks.entry(id).or_default();
                block.push_str(line.trim_end());
                block.push('\n');
                current = Some(id);
            }
            ConfigLine::Body(body) => {
                if let Some(block) = current.and_then(|id| blocks.get_mut(&id)) {
                    block.push_str(body.trim_end());
                    block.push('\n');
                }
            }
            ConfigLine::TopLevel => current = None,
            ConfigLine::Blank => {}
        }
    }

    blocks
}
