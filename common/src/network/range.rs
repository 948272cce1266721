//! # Condensed Interface Ranges
//!
//! Converts between explicit interface lists and the compact notation operators type,
//! e.g. `1/1-3,1/7` for `Ethernet1/1, Ethernet1/2, Ethernet1/3, Ethernet1/7`.
//!
//! [`condense`] and [`expand`] form a round-trip pair for any set of interfaces.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::network::interface::{self, InterfaceId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeFormatError {
    #[error("'{0}' is neither 'module/port' nor 'module/start-end'")]
    InvalidToken(String),
    #[error("range '{token}' starts at {start} but ends at {end}")]
    Descending { token: String, start: u16, end: u16 },
    #[error("range '{0}' spans more than one module")]
    ModuleMismatch(String),
}

/// Collapses interfaces into `module/start-end` runs joined by commas.
///
/// Duplicates are dropped, an empty input yields an empty string.
pub fn condense<I>(ids: I) -> String
where
    I: IntoIterator<Item = InterfaceId>,
{
    let sorted: BTreeSet<InterfaceId> = ids.into_iter().collect();
    let mut tokens: Vec<String> = Vec::new();
    let mut iter = sorted.into_iter();

    let Some(mut run_start) = iter.next() else {
        return String::new();
    };
    let mut run_end = run_start;

    for id in iter {
        if run_end.successor() == Some(id) {
            run_end = id;
            continue;
        }
        tokens.push(run_token(run_start, run_end));
        run_start = id;
        run_end = id;
    }
    tokens.push(run_token(run_start, run_end));

    tokens.join(",")
}

fn run_token(start: InterfaceId, end: InterfaceId) -> String {
    if start == end {
        start.short()
    } else {
        format!("{}-{}", start.short(), end.port())
    }
}

/// Parses a condensed range back into explicit interfaces, in the order written.
///
/// Supported tokens:
/// * `1/5` (optionally `Eth1/5` or `Ethernet1/5`)
/// * `1/3-46`
/// * `1/3-1/46` (the end repeats the module)
pub fn expand(expr: &str) -> Result<Vec<InterfaceId>, RangeFormatError> {
    let mut ids = Vec::new();

    for part in expr.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        ids.extend(expand_token(part)?);
    }

    Ok(ids)
}

/// Same as [`expand`], collected into an ordered set.
pub fn expand_set(expr: &str) -> Result<BTreeSet<InterfaceId>, RangeFormatError> {
    Ok(expand(expr)?.into_iter().collect())
}

fn expand_token(token: &str) -> Result<Vec<InterfaceId>, RangeFormatError> {
    let Some((start_str, end_str)) = token.split_once('-') else {
        let id = token
            .parse::<InterfaceId>()
            .map_err(|_| RangeFormatError::InvalidToken(token.to_string()))?;
        return Ok(vec![id]);
    };

    let start = start_str
        .parse::<InterfaceId>()
        .map_err(|_| RangeFormatError::InvalidToken(token.to_string()))?;
    let end_port = parse_range_end_port(end_str, &start, token)?;

    if start.port() > end_port {
        return Err(RangeFormatError::Descending {
            token: token.to_string(),
            start: start.port(),
            end: end_port,
        });
    }

    Ok((start.port()..=end_port)
        .map(|port| InterfaceId::new(start.module(), port))
        .collect())
}

/// Handles the abbreviated end (`46`) and the full end (`1/46`).
fn parse_range_end_port(
    end_str: &str,
    start: &InterfaceId,
    token: &str,
) -> Result<u16, RangeFormatError> {
    let end_str = interface::strip_media_prefix(end_str.trim());

    if end_str.contains('/') {
        let end = end_str
            .parse::<InterfaceId>()
            .map_err(|_| RangeFormatError::InvalidToken(token.to_string()))?;
        if end.module() != start.module() {
            return Err(RangeFormatError::ModuleMismatch(token.to_string()));
        }
        return Ok(end.port());
    }

    end_str
        .parse::<u16>()
        .map_err(|_| RangeFormatError::InvalidToken(token.to_string()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
