//! Logging setup.
//!
//! Outside CI, events go to stderr in the compact `tracing-subscriber`
//! format. Inside GitHub Actions they are rendered as workflow commands
//! (`::warning::...`) so warnings and errors show up as run annotations.
//! `RUST_LOG` overrides the computed level filter.

use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Plain,
    GithubActions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    pub verbose: bool,
    pub format: LogFormat,
}

impl LogSettings {
    /// Settings derived from the process environment.
    #[must_use]
    pub fn detect(verbose: bool) -> Self {
        Self::from_env(verbose, |key| std::env::var(key).ok())
    }

    /// `RUNNER_DEBUG=1` inside GitHub Actions turns on verbose output, the
    /// same as re-running a job with debug logging enabled.
    pub fn from_env(verbose: bool, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let github = is_github_actions(&lookup);
        let runner_debug = lookup("RUNNER_DEBUG").is_some_and(|v| v == "1");
        Self {
            verbose: verbose || (github && runner_debug),
            format: if github {
                LogFormat::GithubActions
            } else {
                LogFormat::Plain
            },
        }
    }

    #[must_use]
    pub const fn default_directive(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

pub fn is_github_actions(lookup: impl Fn(&str) -> Option<String>) -> bool {
    if lookup("GITHUB_ACTIONS").is_some_and(|v| v == "true") {
        return true;
    }
    lookup("CI").is_some_and(|v| v == "true")
        && lookup("GITHUB_WORKFLOW").is_some_and(|v| !v.is_empty())
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(settings: LogSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.default_directive()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = match settings.format {
        LogFormat::Plain => builder.with_target(false).without_time().compact().try_init(),
        LogFormat::GithubActions => builder.event_format(GithubActionsFormat).try_init(),
    };
}

/// Renders events as GitHub Actions workflow commands.
///
/// Info events are printed without a prefix; there is no `::info::` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct GithubActionsFormat;

impl GithubActionsFormat {
    #[must_use]
    pub const fn command_prefix(level: Level) -> &'static str {
        match level {
            Level::ERROR => "::error::",
            Level::WARN => "::warning::",
            Level::INFO => "",
            Level::DEBUG | Level::TRACE => "::debug::",
        }
    }
}

impl<S, N> FormatEvent<S, N> for GithubActionsFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let prefix = Self::command_prefix(*event.metadata().level());
        if prefix.is_empty() {
            ctx.field_format().format_fields(writer.by_ref(), event)?;
            return writeln!(writer);
        }

        let mut message = String::new();
        ctx.field_format()
            .format_fields(Writer::new(&mut message), event)?;
        writeln!(writer, "{prefix}{}", escape_command_data(&message))
    }
}

/// Escape a workflow command payload so it stays on one line.
#[must_use]
pub fn escape_command_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
