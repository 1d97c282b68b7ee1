//! `motorhub-navigation` — client-side route protection.
//!
//! Decides, per navigation, whether a protected view renders, waits for auth
//! initialization, or redirects (to login, or to the user's own dashboard).
//! Rendering itself belongs to the UI layer.

pub mod auth_state;
pub mod error;
pub mod guard;
pub mod redirects;
pub mod route_table;

pub use auth_state::{AuthState, AuthStateStore, AuthStateSubscription};
pub use error::NavigationError;
pub use guard::{
    GuardDecision, MARKETPLACE_ROUTES, NavigationConfig, Protection, Redirect, RedirectReason, RouteGuard,
};
pub use redirects::{DashboardRedirectMap, PUBLIC_ROOT};
pub use route_table::{PathMatch, RouteRule, RouteTable, normalize_path};
