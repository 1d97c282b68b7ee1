use thiserror::Error;

use motorhub_auth::Role;

/// Configuration errors raised while loading route tables and redirect maps.
///
/// All of these surface at startup; a guard that was built successfully
/// never fails at navigation time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("route path must start with '/': '{0}'")]
    InvalidPath(String),

    #[error("route '{0}' is declared more than once")]
    DuplicateRule(String),

    #[error("no dashboard configured for role '{0}'")]
    UnmappedRole(Role),

    #[error("dashboard for role '{0}' is a route that role may not render")]
    LandingNotReachable(Role),

    #[error("invalid navigation config: {0}")]
    Config(String),
}

impl From<serde_json::Error> for NavigationError {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value.to_string())
    }
}
