use super::fault::FaultInjector;
use crate::domain::UserProfile;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Injected fault: simulated network failure")]
    InjectedFault,
    #[error("User source unavailable: {0}")]
    Unavailable(String),
}

/// Where the profile page gets its user from.
pub trait UserSource: Send + Sync {
    fn fetch_user(&self) -> impl Future<Output = Result<UserProfile, FetchError>> + Send;
}

/// In-process stand-in for a user API.
#[derive(Debug, Clone)]
pub struct MockUserSource {
    user: UserProfile,
    latency: Duration,
    faults: FaultInjector,
}

impl MockUserSource {
    pub fn new(latency: Duration, faults: FaultInjector) -> Self {
        Self {
            user: demo_user(),
            latency,
            faults,
        }
    }

    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.user = user;
        self
    }
}

impl Default for MockUserSource {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), FaultInjector::never())
    }
}

impl UserSource for MockUserSource {
    async fn fetch_user(&self) -> Result<UserProfile, FetchError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.faults.should_fail() {
            debug!(rate = self.faults.rate(), "Injecting user fetch failure");
            return Err(FetchError::InjectedFault);
        }

        Ok(self.user.clone())
    }
}

pub fn demo_user() -> UserProfile {
    UserProfile::new(1, "John Doe", "john.doe@example.com")
}
