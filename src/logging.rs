use std::fmt;

use tracing::{Event, Subscriber, level_filters::LevelFilter};
use tracing_subscriber::{
    Registry,
    fmt::{FmtContext, FormatEvent, FormatFields, format::Writer},
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
};

/// Prints `[LEVEL] message`, the console style of the whole tool.
pub struct BracketFormat;

impl<S, N> FormatEvent<S, N> for BracketFormat
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
        write!(writer, "[{}] ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Lets the menu switch on debug output after logging is already running.
pub struct LogHandle(Option<reload::Handle<LevelFilter, Registry>>);

impl LogHandle {
    /// A handle that controls nothing; used when no subscriber was installed.
    #[cfg(test)]
    pub fn detached() -> Self {
        Self(None)
    }

    pub fn enable_debug(&self) {
        if let Some(handle) = &self.0 {
            if let Err(e) = handle.modify(|filter| *filter = LevelFilter::DEBUG) {
                eprintln!("[ERROR] Could not enable debug logging: {e}");
            }
        }
    }
}

/// Installs the stdout subscriber. INFO by default, DEBUG when `debug` is set.
pub fn init_tracing(debug: bool) -> LogHandle {
    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let (filter, handle) = reload::Layer::new(level);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(BracketFormat)
                .with_writer(std::io::stdout),
        )
        .try_init();

    match installed {
        Ok(()) => LogHandle(Some(handle)),
        Err(e) => {
            eprintln!("[ERROR] Could not set up logging: {e}");
            LogHandle(None)
        }
    }
}
