//! Crash boundary around a component subtree.
//!
//! A boundary renders its child until the child fails once, either by
//! returning a [`RenderError`] or by panicking. From then on it renders a
//! static fallback and never touches the child's render path again.

pub mod component;
pub mod view;

pub use component::{Component, ComponentTrace, RenderError};
pub use view::View;

use crate::domain::{Level, LogEvent, Package};
use crate::reporter::EventSink;
use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, trace};

thread_local! {
    static CATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// True while a boundary on this thread is rendering its child, i.e. any
/// panic raised now will be caught and reported by that boundary.
pub fn catching_panic() -> bool {
    CATCH_DEPTH.with(|depth| depth.get() > 0)
}

struct CatchScope;

impl CatchScope {
    fn enter() -> Self {
        CATCH_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self
    }
}

impl Drop for CatchScope {
    fn drop(&mut self) {
        CATCH_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Boundary state. `Failed` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CrashState {
    #[default]
    Healthy,
    Failed {
        error: String,
        trace: String,
    },
}

impl CrashState {
    pub fn has_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

pub struct CrashBoundary<C> {
    child: C,
    sink: Arc<dyn EventSink>,
    state: CrashState,
}

impl<C: Component> CrashBoundary<C> {
    pub fn new(child: C, sink: Arc<dyn EventSink>) -> Self {
        Self {
            child,
            sink,
            state: CrashState::Healthy,
        }
    }

    /// Runs one render pass.
    ///
    /// The first failure emits a single `fatal` event to the sink and
    /// switches to the fallback for the rest of the boundary's life.
    pub fn render(&mut self) -> View {
        if self.state.has_error() {
            return View::fallback();
        }

        match self.render_child() {
            Ok(view) => view,
            Err(err) => {
                self.fail(err);
                View::fallback()
            }
        }
    }

    pub fn state(&self) -> &CrashState {
        &self.state
    }

    pub fn has_error(&self) -> bool {
        self.state.has_error()
    }

    pub fn child(&self) -> &C {
        &self.child
    }

    /// Mutable access for lifecycle calls driven by the host.
    pub fn child_mut(&mut self) -> &mut C {
        &mut self.child
    }

    fn render_child(&self) -> Result<View, RenderError> {
        let child = &self.child;
        trace!(component = child.name(), "Rendering child");

        let outcome = {
            let _scope = CatchScope::enter();
            panic::catch_unwind(AssertUnwindSafe(|| child.render()))
        };

        match outcome {
            Ok(result) => result.map_err(|err| err.within(child.name())),
            Err(payload) => {
                Err(RenderError::new(panic_message(payload.as_ref())).within(child.name()))
            }
        }
    }

    fn fail(&mut self, err: RenderError) {
        let trace = err.trace().to_string();

        error!(
            component = self.child.name(),
            "Crash boundary caught an error: {err}{trace}"
        );
        self.sink.emit(LogEvent::frontend(
            Level::Fatal,
            Package::Component,
            format!("Crash boundary caught an error: {err}{trace}"),
        ));

        self.state = CrashState::Failed {
            error: err.message,
            trace,
        };
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "component panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::MockEventSink;
    use std::cell::Cell;

    struct Thrower {
        calls: Cell<u32>,
    }

    impl Component for Thrower {
        fn name(&self) -> &str {
            "Thrower"
        }

        fn render(&self) -> Result<View, RenderError> {
            self.calls.set(self.calls.get() + 1);
            Err(RenderError::new("boom"))
        }
    }

    struct Greeter;

    impl Component for Greeter {
        fn name(&self) -> &str {
            "Greeter"
        }

        fn render(&self) -> Result<View, RenderError> {
            Ok(View::text("hello"))
        }
    }

    struct Panicker;

    impl Component for Panicker {
        fn name(&self) -> &str {
            "Panicker"
        }

        fn render(&self) -> Result<View, RenderError> {
            panic!("kaboom at render");
        }
    }

    fn fatal_sink(times: usize, needle: &'static str) -> Arc<dyn EventSink> {
        let mut sink = MockEventSink::new();
        sink.expect_emit()
            .withf(move |event| {
                event.level == Level::Fatal
                    && event.package == Package::Component
                    && event.message.contains(needle)
            })
            .times(times)
            .return_const(());
        Arc::new(sink)
    }

    #[test]
    fn test_failing_child_switches_to_fallback() {
        let child = Thrower {
            calls: Cell::new(0),
        };
        let mut boundary = CrashBoundary::new(child, fatal_sink(1, "boom"));

        let view = boundary.render();

        assert_eq!(view, View::fallback());
        assert!(boundary.has_error());
        match boundary.state() {
            CrashState::Failed { error, trace } => {
                assert_eq!(error, "boom");
                assert!(trace.contains("in Thrower"));
            }
            CrashState::Healthy => panic!("expected failed state"),
        }
    }

    #[test]
    fn test_failed_boundary_never_rerenders_child() {
        let child = Thrower {
            calls: Cell::new(0),
        };
        let mut boundary = CrashBoundary::new(child, fatal_sink(1, "boom"));

        for _ in 0..5 {
            assert_eq!(boundary.render(), View::fallback());
        }

        assert_eq!(boundary.child().calls.get(), 1);
    }

    #[test]
    fn test_healthy_child_renders_unchanged() {
        let mut sink = MockEventSink::new();
        sink.expect_emit().never();
        let mut boundary = CrashBoundary::new(Greeter, Arc::new(sink));

        assert_eq!(boundary.render(), View::text("hello"));
        assert_eq!(boundary.render(), View::text("hello"));
        assert_eq!(boundary.state(), &CrashState::Healthy);
    }

    #[test]
    fn test_panicking_child_is_caught() {
        let mut boundary = CrashBoundary::new(Panicker, fatal_sink(1, "kaboom at render"));

        assert_eq!(boundary.render(), View::fallback());
        assert!(boundary.has_error());
        assert_eq!(boundary.render(), View::fallback());
    }

    struct ScopeWitness {
        seen: Cell<Option<bool>>,
    }

    impl Component for ScopeWitness {
        fn name(&self) -> &str {
            "ScopeWitness"
        }

        fn render(&self) -> Result<View, RenderError> {
            self.seen.set(Some(catching_panic()));
            Ok(View::Empty)
        }
    }

    #[test]
    fn test_catch_scope_covers_child_render_only() {
        let mut sink = MockEventSink::new();
        sink.expect_emit().never();
        let child = ScopeWitness {
            seen: Cell::new(None),
        };
        let mut boundary = CrashBoundary::new(child, Arc::new(sink));

        assert!(!catching_panic());
        boundary.render();

        assert_eq!(boundary.child().seen.get(), Some(true));
        assert!(!catching_panic());
    }

    #[test]
    fn test_catch_scope_is_released_after_panic() {
        let mut boundary = CrashBoundary::new(Panicker, fatal_sink(1, "kaboom"));

        boundary.render();

        assert!(!catching_panic());
    }

    #[test]
    fn test_panic_message_handles_payload_kinds() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "component panicked");
    }
}
