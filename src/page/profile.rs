use super::source::UserSource;
use crate::boundary::{Component, RenderError, View};
use crate::domain::{Level, LogEvent, Package, UserProfile};
use crate::reporter::EventSink;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    Loading,
    Ready(UserProfile),
    Unavailable(String),
}

/// The user profile page.
///
/// Reports its lifecycle and interactions to the sink. A failed fetch
/// makes the next render fail, which is what an enclosing crash boundary
/// is there to catch.
pub struct ProfilePage<S> {
    source: S,
    sink: Arc<dyn EventSink>,
    state: PageState,
}

impl<S: UserSource> ProfilePage<S> {
    pub fn new(source: S, sink: Arc<dyn EventSink>) -> Self {
        Self {
            source,
            sink,
            state: PageState::Loading,
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Loads the user; the outcome lands in [`PageState`].
    pub async fn mount(&mut self) {
        self.emit(Level::Info, Package::Page, "ProfilePage mounted");
        self.emit(Level::Debug, Package::Api, "Fetching user data");

        match self.source.fetch_user().await {
            Ok(user) => {
                debug!(user_id = user.id, "User data loaded");
                self.emit(
                    Level::Info,
                    Package::Api,
                    format!("User data loaded for user {}", user.id),
                );
                self.state = PageState::Ready(user);
            }
            Err(e) => {
                warn!("User fetch failed: {e}");
                self.emit(
                    Level::Error,
                    Package::Api,
                    format!("Failed to fetch user data: {e}"),
                );
                self.state = PageState::Unavailable(e.to_string());
            }
        }
    }

    pub fn click_edit(&self) {
        self.emit(Level::Info, Package::Component, "Edit profile button clicked");
    }

    pub fn unmount(&self) {
        self.emit(Level::Debug, Package::Page, "ProfilePage unmounted");
    }

    fn emit(&self, level: Level, package: Package, message: impl Into<String>) {
        self.sink.emit(LogEvent::frontend(level, package, message));
    }
}

impl<S: UserSource> Component for ProfilePage<S> {
    fn name(&self) -> &str {
        "ProfilePage"
    }

    fn render(&self) -> Result<View, RenderError> {
        let card = ProfileCard { state: &self.state }
            .render()
            .map_err(|e| e.within(self.name()))?;

        Ok(View::titled("User Profile", vec![card]))
    }
}

/// Card holding the user's details; fails when there is no user to show.
struct ProfileCard<'a> {
    state: &'a PageState,
}

impl Component for ProfileCard<'_> {
    fn name(&self) -> &str {
        "ProfileCard"
    }

    fn render(&self) -> Result<View, RenderError> {
        match self.state {
            PageState::Loading => Ok(View::text("Loading user data...")),
            PageState::Ready(user) => Ok(View::panel(vec![
                View::heading(&user.name),
                View::field("ID", user.id.to_string()),
                View::field("Email", &user.email),
                View::button("Edit Profile"),
            ])),
            PageState::Unavailable(reason) => Err(RenderError::new(format!(
                "Unable to render profile: {reason}"
            ))
            .within(self.name())),
        }
    }
}
