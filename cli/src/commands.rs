pub mod apply;
pub mod diff;
pub mod range;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use ppsync_common::config::{DEFAULT_DIFF_CONTEXT, MAX_DIFF_CONTEXT};

pub const DEFAULT_RANGE: &str = "1/1-46";
pub const DEFAULT_INVENTORY: &str = "hosts.txt";

#[derive(Parser)]
#[command(name = "ppsync")]
#[command(about = "Applies the BAREMETAL port-profile to switched interfaces, leaving routed ports alone.")]
#[command(version)]
pub struct CommandLine {
    /// Less output: -q hides headers and info logs, -qq shows errors only
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile every device in the inventory
    #[command(alias = "a")]
    Apply(ApplyArgs),
    /// Expand an interface range and print it condensed
    #[command(alias = "r")]
    Range {
        /// e.g. "1/1-46" or "Ethernet1/3,1/7-9"
        expr: String,
    },
    /// Compare two saved running-config captures
    #[command(alias = "d")]
    Diff {
        before: PathBuf,
        after: PathBuf,
        /// Lines of context around each change (0-3)
        #[arg(short, long, default_value_t = DEFAULT_DIFF_CONTEXT, value_parser = parse_context)]
        context: usize,
    },
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Plan and print the commands without sending them
    #[arg(long)]
    pub dry_run: bool,

    /// File listing device addresses, one per line
    #[arg(short, long, default_value = DEFAULT_INVENTORY)]
    pub inventory: PathBuf,

    /// Interfaces the profile should be applied to
    #[arg(short, long, default_value = DEFAULT_RANGE)]
    pub range: String,

    /// SSH username (prompted for when omitted)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Prompt for an SSH password instead of using keys
    #[arg(long)]
    pub ask_pass: bool,

    /// Directory for per-device snapshots and diffs
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Lines of context around each diff hunk (0-3)
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_DIFF_CONTEXT,
        value_parser = parse_context
    )]
    pub context: usize,
}

fn parse_context(s: &str) -> Result<usize, String> {
    let value: usize = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if value > MAX_DIFF_CONTEXT {
        return Err(format!("context must be between 0 and {MAX_DIFF_CONTEXT}"));
    }
    Ok(value)
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_defaults() {
        let cli = CommandLine::try_parse_from(["ppsync", "apply", "-u", "admin"]).unwrap();
        let Commands::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        assert!(!args.dry_run);
        assert_eq!(args.range, DEFAULT_RANGE);
        assert_eq!(args.inventory, PathBuf::from(DEFAULT_INVENTORY));
        assert_eq!(args.context, DEFAULT_DIFF_CONTEXT);
    }

    #[test]
    fn dry_run_flag_and_quiet_count() {
        let cli = CommandLine::try_parse_from(["ppsync", "-qq", "a", "--dry-run"]).unwrap();
        assert_eq!(cli.quiet, 2);
        assert!(matches!(cli.command, Commands::Apply(ApplyArgs { dry_run: true, .. })));
    }

    #[test]
    fn context_is_bounded() {
        assert!(CommandLine::try_parse_from(["ppsync", "apply", "-c", "4"]).is_err());
        assert!(CommandLine::try_parse_from(["ppsync", "apply", "-c", "0"]).is_ok());
    }
}
