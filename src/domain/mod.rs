//! Domain layer for profile-guard.
//!
//! Contains the types shared across all modules:
//! - `LogEvent` with its closed tags `Stack`, `Level`, `Package`
//! - `UserProfile`: the record the profile page displays
//! - `AppError`: top-level error type

pub mod error;
pub mod log_event;
pub mod user;

pub use error::AppError;
pub use log_event::{Level, LogEvent, Package, Stack, UnknownTag};
pub use user::UserProfile;
