//! Subscriber assembly.

use std::io;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::TestWriter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::{Config, DisplayConfig, Format, WriterConfig};
use crate::LogError;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Applies the shared display toggles and boxes the layer.
macro_rules! fmt_layer {
    ($layer:expr, $display:expr, $writer:expr) => {{
        let layer = $layer
            .with_writer($writer)
            .with_ansi($display.colors)
            .with_target($display.target)
            .with_file($display.source)
            .with_line_number($display.source)
            .with_thread_ids($display.thread_ids);
        let boxed: BoxedLayer = if $display.time {
            layer.boxed()
        } else {
            layer.without_time().boxed()
        };
        boxed
    }};
}

/// Builds and installs the global subscriber.
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Keeps the logger's resources alive.
///
/// Holds the root span when [`Config::resource`] is set; dropping the guard
/// exits it.
#[derive(Debug)]
#[must_use = "dropping the guard exits the root span"]
pub struct LoggerGuard {
    _root: Option<tracing::span::EnteredSpan>,
}

impl LoggerGuard {
    pub(crate) fn noop() -> Self {
        Self { _root: None }
    }
}

impl LoggerBuilder {
    /// Create a builder from `config`.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Parse the filter directives without installing anything.
    pub fn filter(&self) -> Result<EnvFilter, LogError> {
        EnvFilter::try_new(&self.config.level).map_err(|e| LogError::Filter {
            filter: self.config.level.clone(),
            reason: e.to_string(),
        })
    }

    /// Install the subscriber as the global default.
    ///
    /// # Errors
    ///
    /// Fails when the filter does not parse or a global subscriber is
    /// already installed.
    pub fn build(self) -> Result<LoggerGuard, LogError> {
        let filter = self.filter()?;
        let layer = format_layer(
            self.config.format,
            &self.config.display,
            make_writer(self.config.writer),
        );

        Registry::default()
            .with(layer)
            .with(filter)
            .try_init()
            .map_err(|e| LogError::Init(e.to_string()))?;

        let root = self
            .config
            .resource
            .as_deref()
            .map(|resource| tracing::info_span!("resource", name = resource).entered());
        Ok(LoggerGuard { _root: root })
    }
}

fn make_writer(writer: WriterConfig) -> BoxMakeWriter {
    match writer {
        WriterConfig::Stderr => BoxMakeWriter::new(io::stderr),
        WriterConfig::Stdout => BoxMakeWriter::new(io::stdout),
        WriterConfig::Test => BoxMakeWriter::new(TestWriter::default()),
    }
}

fn format_layer(format: Format, display: &DisplayConfig, writer: BoxMakeWriter) -> BoxedLayer {
    let base = tracing_subscriber::fmt::layer::<Registry>();
    match format {
        Format::Pretty => fmt_layer!(base.pretty(), display, writer),
        Format::Compact => fmt_layer!(base.compact(), display, writer),
        Format::Json => fmt_layer!(
            base.json()
                .with_current_span(true)
                .with_span_list(display.span_list)
                .flatten_event(display.flatten),
            display,
            writer
        ),
    }
}
