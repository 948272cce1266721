use std::time::Duration;

use colored::*;
use ppsync_common::network::mac::{self, MacTableEntry};
use ppsync_core::coordinator::{DeviceReport, Outcome};
use ppsync_core::differ::{Hunk, LineTag, MacDiff};

use crate::terminal::{colors, print};

type Detail = (String, ColoredString);

fn range_or_none(condensed: String) -> ColoredString {
    if condensed.is_empty() {
        "none".color(colors::SEPARATOR)
    } else {
        condensed.color(colors::INTERFACE)
    }
}

fn counted(count: usize, condensed: String) -> ColoredString {
    let range = range_or_none(condensed);
    format!("{} {}", count.to_string().bold(), range).normal()
}

/// Key/value lines describing one device's plan and outcome.
pub fn report_details(report: &DeviceReport) -> Vec<Detail> {
    let counts = report.counts();
    let summary = report.plan.summary();

    let mut details: Vec<Detail> = vec![
        ("Eligible".to_string(), counted(counts.eligible, summary.eligible)),
        ("Routed".to_string(), counted(counts.skipped_l3, summary.skipped_l3)),
        ("Present".to_string(), counted(counts.already_configured, summary.already_configured)),
    ];

    match &report.outcome {
        Outcome::DryRun => {
            details.push(("Pending".to_string(), counted(counts.pending, summary.to_configure)));
            details.push((
                "Commands".to_string(),
                format!("{} (not sent)", report.commands.len()).yellow(),
            ));
        }
        Outcome::Applied(change) => {
            details.push(("Applied".to_string(), counted(counts.newly_configured, summary.to_configure)));
            details.push(("Profile".to_string(), seconds(change.profile_elapsed)));
            details.push(("Interfaces".to_string(), seconds(change.interfaces_elapsed)));
            details.push(("Config".to_string(), hunk_count(counts.config_hunks)));
            details.push(("MAC".to_string(), hunk_count(counts.mac_hunks)));
        }
    }

    details
}

fn seconds(elapsed: Duration) -> ColoredString {
    format!("{:.2}s", elapsed.as_secs_f64()).yellow()
}

fn hunk_count(hunks: Option<usize>) -> ColoredString {
    match hunks {
        Some(0) => "unchanged".color(colors::SEPARATOR),
        Some(n) => format!("{n} hunk(s)").bold(),
        None => "-".color(colors::SEPARATOR),
    }
}

/// Prints hunks the way `git diff` would, removed lines red and added lines green.
pub fn print_hunks(hunks: &[Hunk]) {
    for hunk in hunks {
        let header = format!(
            "@@ -{},{} +{},{} @@",
            hunk.old_start, hunk.old_len, hunk.new_start, hunk.new_len
        );
        print::print(&format!("{}", header.color(colors::HUNK_HEADER)));
        for line in &hunk.lines {
            let rendered = match line.tag {
                LineTag::Context => format!(" {}", line.text).normal(),
                LineTag::Removed => format!("-{}", line.text).color(colors::DIFF_BEFORE),
                LineTag::Added => format!("+{}", line.text).color(colors::DIFF_AFTER),
            };
            print::print(&format!("{rendered}"));
        }
    }
}

fn mac_line(marker: char, entry: &MacTableEntry) -> String {
    let vendor = mac::get_vendor(entry.mac).unwrap_or_default();
    format!("{marker}{entry}  {vendor}").trim_end().to_string()
}

/// Lists added and removed MAC entries with their vendor, when known.
pub fn print_mac_changes(changes: &MacDiff) {
    for entry in &changes.removed {
        print::print(&format!("{}", mac_line('-', entry).color(colors::DIFF_BEFORE)));
    }
    for entry in &changes.added {
        print::print(&format!("{}", mac_line('+', entry).color(colors::DIFF_AFTER)));
    }
    print::print(&format!(
        "{}",
        format!("{} entries unchanged", changes.unchanged).color(colors::MAC_ADDR)
    ));
}
