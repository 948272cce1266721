use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::*;
use ppsync_core::differ;

use crate::terminal::{colors, format, print};

/// Offline diff of two saved running-config captures.
pub fn diff(before: &Path, after: &Path, context: usize, quiet: u8) -> anyhow::Result<()> {
    let read = |path: &Path| {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    };
    let before_text = read(before)?;
    let after_text = read(after)?;

    let hunks = differ::diff_config(&before_text, &after_text, context);

    if quiet == 0 {
        print::aligned_line("Before", before.display().to_string().color(colors::DIFF_BEFORE));
        print::aligned_line("After", after.display().to_string().color(colors::DIFF_AFTER));
        print::aligned_line("Hunks", hunks.len().to_string().bold());
    }

    if hunks.is_empty() {
        print::print_status("no differences");
        return Ok(());
    }
    format::print_hunks(&hunks);
    Ok(())
}
