//! The profile page and its user data source.

pub mod fault;
pub mod profile;
pub mod source;

pub use fault::{FaultInjector, InvalidFaultRate};
pub use profile::{PageState, ProfilePage};
pub use source::{FetchError, MockUserSource, UserSource, demo_user};
