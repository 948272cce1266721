use anyhow::Context;
use colored::*;
use ppsync_common::network::range;

use crate::terminal::{colors, print};

/// Expands `expr`, then prints it back in canonical condensed form.
pub fn range(expr: &str, quiet: u8) -> anyhow::Result<()> {
    let ids = range::expand_set(expr).with_context(|| format!("invalid interface range '{expr}'"))?;
    let condensed = range::condense(ids.iter().copied());

    if quiet > 0 {
        print::print(&condensed);
        return Ok(());
    }

    print::aligned_line("Condensed", condensed.color(colors::INTERFACE));
    print::aligned_line("Count", ids.len().to_string().bold());
    if let (Some(first), Some(last)) = (ids.first(), ids.last()) {
        print::aligned_line("First", first.to_string().color(colors::INTERFACE));
        print::aligned_line("Last", last.to_string().color(colors::INTERFACE));
    }
    Ok(())
}
