use colored::*;
use ppsync_common::SUCCESS_TARGET;
use tracing::{Event, Level, Subscriber};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

/// Events on this target are printed verbatim, without a status symbol.
pub const PRINT_TARGET: &str = "ppsync::print";

pub struct PpsyncFormatter;

impl<S, N> FormatEvent<S, N> for PpsyncFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        if meta.target() != PRINT_TARGET {
            let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) =
                match (*meta.level(), meta.target() == SUCCESS_TARGET) {
                    (_, true) => ("[+]", |s| s.green().bold()),
                    (Level::TRACE, _) => ("[ ]", |s| s.dimmed()),
                    (Level::DEBUG, _) => ("[?]", |s| s.blue()),
                    (Level::INFO, _) => ("[*]", |s| s.cyan().bold()),
                    (Level::WARN, _) => ("[!]", |s| s.yellow().bold()),
                    (Level::ERROR, _) => ("[-]", |s| s.red().bold()),
                };
            write!(writer, "{} ", color_func(symbol.into()))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Quiet levels raise the general threshold; printed output and completions always pass.
fn default_directives(quiet: u8) -> String {
    let default_level = match quiet {
        0 => "info",
        1 => "warn",
        _ => "error",
    };
    format!("{default_level},{PRINT_TARGET}=info,{SUCCESS_TARGET}=info")
}

/// Installs the global subscriber: status-symbol formatting, `RUST_LOG` filtering
/// (default `info`) and one spinner per open span.
pub fn init_logging(quiet: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(quiet)));

    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(PpsyncFormatter)
                .with_writer(indicatif_layer.get_stderr_writer()),
        )
        .with(indicatif_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_levels_keep_completions() {
        for quiet in 0..=2 {
            let directives = default_directives(quiet);
            assert!(directives.contains("ppsync::success=info"), "{directives}");
            assert!(directives.contains("ppsync::print=info"), "{directives}");
        }
    }

    #[test]
    fn quiet_levels_raise_the_threshold() {
        assert!(default_directives(0).starts_with("info,"));
        assert!(default_directives(1).starts_with("warn,"));
        assert!(default_directives(2).starts_with("error,"));
    }

    #[test]
    fn directives_parse() {
        assert!(EnvFilter::try_new(default_directives(1)).is_ok());
    }
}
