use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use ppsync_common::config::Config;
use ppsync_common::network::range;
use ppsync_common::success;
use ppsync_core::coordinator::{Coordinator, DeviceReport, Outcome, RunError, RunSummary};
use tracing::{Instrument, info_span};

use crate::adapters::{artifacts::FsArtifactSink, credentials, inventory, ssh::SshConnector};
use crate::commands::ApplyArgs;
use crate::pprint;
use crate::terminal::{colors, format, print};

pub async fn apply(args: ApplyArgs, quiet: u8) -> anyhow::Result<()> {
    let devices: Vec<String> = inventory::load(&args.inventory)?;
    let interfaces = range::expand_set(&args.range)
        .with_context(|| format!("invalid interface range '{}'", args.range))?;
    if interfaces.is_empty() {
        anyhow::bail!("interface range '{}' selects nothing", args.range);
    }

    let mut cfg = Config::new(interfaces)
        .with_dry_run(args.dry_run)
        .with_diff_context(args.context);
    cfg.quiet = quiet;
    cfg.output_dir = args.output_dir;

    print_run_settings(&devices, &cfg);

    let credentials = credentials::prompt(args.username, args.ask_pass)?;
    let cfg = Arc::new(cfg);
    let mut coordinator = Coordinator::new(Arc::new(SshConnector::new(credentials)), cfg.clone());
    if let Some(dir) = &cfg.output_dir {
        coordinator = coordinator.with_sink(Arc::new(FsArtifactSink::new(dir)));
    }

    let span = info_span!("reconcile", indicatif.pb_show = true);
    let start_time: Instant = Instant::now();
    let summary: RunSummary = coordinator.run_all(devices).instrument(span).await;

    run_ends(&summary, start_time.elapsed(), &cfg);

    if !summary.is_success() {
        anyhow::bail!(
            "{} of {} device(s) failed",
            summary.failures.len(),
            summary.failures.len() + summary.reports.len()
        );
    }
    Ok(())
}

fn print_run_settings(devices: &[String], cfg: &Config) {
    if cfg.quiet > 0 {
        return;
    }

    let mode: ColoredString = if cfg.dry_run {
        "dry run".yellow()
    } else {
        "apply".bold().green()
    };
    print::aligned_line("Devices", devices.len().to_string().bold());
    print::aligned_line(
        "Range",
        range::condense(cfg.interfaces.iter().copied()).color(colors::INTERFACE),
    );
    print::aligned_line("Profile", cfg.profile.name().color(colors::ACCENT));
    print::aligned_line("Mode", mode);
    if let Some(dir) = &cfg.output_dir {
        print::aligned_line("Output", dir.display());
    }
}

fn run_ends(summary: &RunSummary, total_time: Duration, cfg: &Config) {
    if cfg.quiet > 0 {
        pprint!();
    }

    print::header("Reconciliation", cfg.quiet);
    print_reports(&summary.reports, cfg);
    print_failures(&summary.failures, summary.reports.len(), cfg);
    print_summary(summary, total_time, cfg);
}

fn print_reports(reports: &[DeviceReport], cfg: &Config) {
    for (idx, report) in reports.iter().enumerate() {
        if cfg.quiet == 2 {
            continue;
        }
        print::tree_head(idx, &report.device);
        print::as_tree_one_level(format::report_details(report));

        if cfg.quiet == 0 {
            print_device_changes(report);
        }
        if idx + 1 != reports.len() {
            pprint!();
        }
    }
}

fn print_device_changes(report: &DeviceReport) {
    match &report.outcome {
        Outcome::DryRun => {
            if report.plan.is_noop() {
                return;
            }
            pprint!();
            for line in report.commands.lines() {
                print::print_status(line);
            }
        }
        Outcome::Applied(change) => {
            if change.config_diff.changed() {
                pprint!();
                format::print_hunks(change.config_diff.hunks());
            }
            if change.mac_diff.changed() {
                pprint!();
                format::print_mac_changes(&change.mac_diff.mac_changes());
            }
        }
    }
}

fn print_failures(failures: &[RunError], offset: usize, cfg: &Config) {
    if failures.is_empty() || cfg.quiet == 2 {
        return;
    }

    let mut sorted: Vec<&RunError> = failures.iter().collect();
    sorted.sort_by(|a, b| a.device().cmp(b.device()));

    if offset > 0 {
        pprint!();
    }
    for (idx, failure) in sorted.iter().enumerate() {
        print::tree_head(offset + idx, failure.device());
        print::as_tree_one_level(vec![(
            "Failed".to_string(),
            failure.detail().red(),
        )]);
    }
}

fn print_summary(summary: &RunSummary, total_time: Duration, cfg: &Config) {
    let configured: usize = summary
        .reports
        .iter()
        .map(|r| r.counts().newly_configured)
        .sum();
    let pending: usize = summary.reports.iter().map(|r| r.counts().pending).sum();

    let devices: ColoredString = format!("{} device(s)", summary.reports.len()).bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let changed: ColoredString = if cfg.dry_run {
        format!("{pending} interface(s) pending").bold()
    } else {
        format!("{configured} interface(s) configured").bold()
    };
    let output: ColoredString = format!("{devices} reconciled, {changed} in {total_time}")
        .color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output.to_string());
            if !summary.failures.is_empty() {
                let failed = format!("{} device(s) failed", summary.failures.len()).red();
                print::centerln(&failed.to_string());
            }
            print::end_of_program();
        }
        _ => {
            pprint!();
            success!("{}", output);
        }
    }
}
