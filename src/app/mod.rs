pub mod config;
pub mod logging_system;

pub use config::{Config, ConfigError, LogFormat, TracingLevel};
pub use logging_system::{InitializationError, LogDirective, LoggingSystem, setup_logging};

use crate::boundary::{self, CrashBoundary, View};
use crate::domain::{AppError, Level, LogEvent, Package};
use crate::page::{MockUserSource, ProfilePage};
use crate::reporter::{DeliverySnapshot, EventSink, LogReporter};
use std::io::Write;
use std::panic::PanicHookInfo;
use std::sync::{Arc, Once};
use tracing::{debug, info, warn};

/// Outcome of one demo session.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub passes: Vec<View>,
    pub crashed: bool,
    pub drained: bool,
    pub delivery: DeliverySnapshot,
}

/// Wires the reporter, the profile page and its crash boundary.
pub struct App {
    config: Config,
    reporter: LogReporter,
    boundary: CrashBoundary<ProfilePage<MockUserSource>>,
}

impl App {
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let reporter = LogReporter::new(config.reporter_config())?;
        let sink: Arc<dyn EventSink> = Arc::new(reporter.clone());

        let source = MockUserSource::new(config.fetch_latency, config.fault_injector()?);
        let page = ProfilePage::new(source, sink.clone());
        let boundary = CrashBoundary::new(page, sink);

        info!("Starting profile-guard v{}", env!("CARGO_PKG_VERSION"));
        info!(
            "Configuration: collector={}, fault_rate={}, fetch_latency={:?}",
            reporter.endpoint(),
            config.fault_rate,
            config.fetch_latency
        );

        Ok(Self {
            config,
            reporter,
            boundary,
        })
    }

    pub fn reporter(&self) -> &LogReporter {
        &self.reporter
    }

    /// Runs the page through mount, one interaction and unmount, writing
    /// each render pass to `out`.
    pub async fn run<W: Write>(mut self, out: &mut W) -> RunSummary {
        self.reporter.emit(LogEvent::frontend(
            Level::Info,
            Package::App,
            "Application started",
        ));

        let mut passes = Vec::new();
        self.render_pass(out, &mut passes);

        self.boundary.child_mut().mount().await;
        self.render_pass(out, &mut passes);

        if !self.boundary.has_error() {
            self.boundary.child().click_edit();
            self.render_pass(out, &mut passes);
        }

        self.boundary.child().unmount();

        let drained = self.reporter.shutdown(self.config.shutdown_grace).await;
        let delivery = self.reporter.stats();
        if delivery.failed > 0 {
            warn!(
                failed = delivery.failed,
                "Some log events did not reach the collector"
            );
        }

        RunSummary {
            passes,
            crashed: self.boundary.has_error(),
            drained,
            delivery,
        }
    }

    fn render_pass<W: Write>(&mut self, out: &mut W, passes: &mut Vec<View>) {
        let view = self.boundary.render();
        if let Err(e) = writeln!(out, "{view}") {
            warn!("Failed to write render pass: {e}");
        }
        passes.push(view);
    }
}

/// Routes panics caught by a crash boundary into `tracing` instead of the
/// default stderr report. Other panics go to the previous hook unchanged.
///
/// Installed at most once per process.
pub fn install_panic_hook() {
    static INSTALL: Once = Once::new();

    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            if boundary::catching_panic() {
                log_boundary_panic(panic_info);
            } else {
                previous(panic_info);
            }
        }));
    });
}

fn log_boundary_panic(panic_info: &PanicHookInfo<'_>) {
    let message = boundary::panic_message(panic_info.payload());

    match panic_info.location() {
        Some(location) => debug!(
            file = location.file(),
            line = location.line(),
            panic = %message,
            "Render panic handed to crash boundary"
        ),
        None => debug!(panic = %message, "Render panic handed to crash boundary"),
    }
}

/// Entry point used by the binary.
pub async fn main() -> anyhow::Result<()> {
    let config = match Config::from_args(std::env::args_os()) {
        Ok(config) => config,
        Err(ConfigError::Args(e)) => e.exit(),
        Err(e) => return Err(e.into()),
    };

    setup_logging(config.log_level, config.log_format)?;
    install_panic_hook();

    let app = App::from_config(config)?;
    let summary = app.run(&mut std::io::stdout()).await;

    info!(
        crashed = summary.crashed,
        delivered = summary.delivery.delivered,
        failed = summary.delivery.failed,
        "profile-guard finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{Component, RenderError};
    use crate::domain::LogEvent;
    use tracing_test::traced_test;

    struct Exploding;

    impl Component for Exploding {
        fn name(&self) -> &str {
            "Exploding"
        }

        fn render(&self) -> Result<View, RenderError> {
            panic!("render exploded");
        }
    }

    struct DiscardSink;

    impl EventSink for DiscardSink {
        fn emit(&self, _event: LogEvent) {}
    }

    #[test]
    #[traced_test]
    fn test_boundary_panic_goes_to_tracing() {
        install_panic_hook();
        install_panic_hook();

        let mut boundary = CrashBoundary::new(Exploding, Arc::new(DiscardSink));
        assert_eq!(boundary.render(), View::fallback());

        assert!(logs_contain("Render panic handed to crash boundary"));
        assert!(logs_contain("render exploded"));
    }

    #[test]
    fn test_panics_outside_boundary_still_propagate() {
        install_panic_hook();

        let result = std::panic::catch_unwind(|| -> u8 { panic!("plain panic") });

        assert!(result.is_err());
        assert!(!boundary::catching_panic());
    }
}
