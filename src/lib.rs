// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
#![allow(
    clippy::missing_errors_doc,      // Internal API
    clippy::missing_panics_doc,      // Internal API
    clippy::module_name_repetitions, // e.g. ReportError in reporter module
    clippy::must_use_candidate       // Annotated selectively on critical APIs
)]

pub mod app;
pub mod boundary;
pub mod domain;
pub mod page;
pub mod reporter;

// Re-export main types for easy access
pub use app::{App, Config};
pub use boundary::{Component, CrashBoundary, CrashState, RenderError, View};
pub use domain::{Level, LogEvent, Package, Stack, UserProfile};
pub use reporter::{EventSink, LogReporter};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
