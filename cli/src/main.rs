mod adapters;
mod commands;
mod terminal;

use commands::{CommandLine, Commands, apply, diff, range};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let quiet = commands.quiet;

    logging::init_logging(quiet);
    print::banner(quiet);

    match commands.command {
        Commands::Apply(args) => {
            let title = if args.dry_run { "planning dry run" } else { "reconciling devices" };
            print::header(title, quiet);
            apply::apply(args, quiet).await
        }
        Commands::Range { expr } => {
            print::header("interface range", quiet);
            range::range(&expr, quiet)
        }
        Commands::Diff { before, after, context } => {
            print::header("running-config diff", quiet);
            diff::diff(&before, &after, context, quiet)
        }
    }
}
