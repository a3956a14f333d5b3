//! Remote log reporting.
//!
//! Every event is posted to the collector as one JSON request. Delivery is
//! best-effort: failures are written as local `tracing` diagnostics and
//! never reach the caller.

pub mod client;
pub mod stats;

pub use client::{CollectorClient, LOG_PATH, ReportError, ReporterConfig};
pub use stats::{DeliverySnapshot, DeliveryStats};

use crate::domain::{Level, LogEvent, Package, Stack};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

#[cfg(test)]
use mockall::automock;

/// Fire-and-forget destination for log events.
#[cfg_attr(test, automock)]
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LogEvent);
}

/// Posts log events to the collector.
#[derive(Debug, Clone)]
pub struct LogReporter {
    client: CollectorClient,
    stats: Arc<DeliveryStats>,
    tracker: TaskTracker,
}

impl LogReporter {
    pub fn new(config: ReporterConfig) -> Result<Self, ReportError> {
        let client = CollectorClient::new(&config)?;
        debug!("Log reporter targeting {}", client.log_url());

        Ok(Self {
            client,
            stats: Arc::new(DeliveryStats::new()),
            tracker: TaskTracker::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        self.client.log_url().as_str()
    }

    /// Reports one event and returns the collector's JSON reply.
    ///
    /// Returns `None` on any failure; the cause is logged locally.
    pub async fn report(
        &self,
        stack: Stack,
        level: Level,
        package: Package,
        message: impl Into<String>,
    ) -> Option<Value> {
        self.deliver(LogEvent::new(stack, level, package, message))
            .await
    }

    pub async fn deliver(&self, event: LogEvent) -> Option<Value> {
        self.stats.record_attempt();

        match self.client.send(&event).await {
            Ok(reply) => {
                self.stats.record_outcome(true);
                debug!(
                    level = %event.level,
                    package = %event.package,
                    "Log event delivered"
                );
                Some(reply)
            }
            Err(ReportError::HttpError { status, message }) => {
                self.stats.record_outcome(false);
                error!(
                    status,
                    level = %event.level,
                    package = %event.package,
                    "Failed to send log: HTTP {status}: {message}"
                );
                None
            }
            Err(e) => {
                self.stats.record_outcome(false);
                error!(
                    level = %event.level,
                    package = %event.package,
                    "Error sending log: {e}"
                );
                None
            }
        }
    }

    /// Spawns the report as a detached task on the current runtime.
    ///
    /// The handle may be dropped; the task still runs to completion.
    /// Returns `None` when called outside a tokio runtime, in which case
    /// the event is dropped.
    pub fn dispatch(&self, event: LogEvent) -> Option<JoinHandle<()>> {
        let Ok(handle) = Handle::try_current() else {
            self.stats.record_dropped();
            warn!(
                level = %event.level,
                package = %event.package,
                "No async runtime available, dropping log event"
            );
            return None;
        };

        let reporter = self.clone();
        Some(self.tracker.spawn_on(
            async move {
                reporter.deliver(event).await;
            },
            &handle,
        ))
    }

    /// Waits up to `grace` for detached reports to finish.
    ///
    /// Returns `true` when nothing was left in flight.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();
        let drained = tokio::time::timeout(grace, self.tracker.wait())
            .await
            .is_ok();

        let snapshot = self.stats.snapshot();
        if drained {
            info!(
                delivered = snapshot.delivered,
                failed = snapshot.failed,
                dropped = snapshot.dropped,
                "Log reporter drained"
            );
        } else {
            warn!(
                in_flight = self.tracker.len(),
                "Log reporter shutdown grace period elapsed"
            );
        }
        drained
    }

    pub fn stats(&self) -> DeliverySnapshot {
        self.stats.snapshot()
    }
}

impl EventSink for LogReporter {
    fn emit(&self, event: LogEvent) {
        // Detached by contract.
        let _ = self.dispatch(event);
    }
}
