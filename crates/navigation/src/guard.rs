//! Route guard: render, redirect, or wait.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use motorhub_auth::Role;

use crate::{AuthState, AuthStateStore, DashboardRedirectMap, NavigationError, RouteRule, RouteTable};

pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Query parameter carrying the originally requested path to the login page.
pub const RETURN_TO_PARAM: &str = "redirect";

/// What a guarded subtree needs from the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Protection {
    pub require_auth: bool,
    /// `None` or empty: no role restriction.
    pub allowed_roles: Option<Vec<Role>>,
    /// Overrides the guard's login path for unauthenticated users.
    pub login_path: Option<String>,
}

impl Default for Protection {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_roles: None,
            login_path: None,
        }
    }
}

impl Protection {
    pub fn roles(roles: &[Role]) -> Self {
        Self {
            allowed_roles: Some(roles.to_vec()),
            ..Self::default()
        }
    }

    pub fn restricts_roles(&self) -> bool {
        self.allowed_roles.as_ref().is_some_and(|r| !r.is_empty())
    }
}

fn role_permitted(protection: &Protection, role: Role) -> bool {
    match protection.allowed_roles.as_deref() {
        Some(allowed) if !allowed.is_empty() => allowed.contains(&role),
        _ => true,
    }
}

impl From<&RouteRule> for Protection {
    fn from(rule: &RouteRule) -> Self {
        Self {
            require_auth: rule.require_auth,
            allowed_roles: rule.allowed_roles.clone(),
            login_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    Unauthenticated,
    Forbidden,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: String,
    /// Where to send the user back to after signing in.
    pub return_to: Option<String>,
    pub reason: RedirectReason,
}

impl Redirect {
    /// Full redirect target, with the return path encoded as a query parameter.
    pub fn location(&self) -> String {
        match &self.return_to {
            Some(back) => {
                let sep = if self.to.contains('?') { '&' } else { '?' };
                format!("{}{sep}{RETURN_TO_PARAM}={}", self.to, urlencoding::encode(back))
            }
            None => self.to.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Auth state not known yet; show a loading indicator.
    Loading,
    Render,
    Redirect(Redirect),
}

/// Serialized navigation config (`routes.json` shape).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationConfig {
    #[serde(default = "default_login_path")]
    pub login_path: String,
    pub dashboards: HashMap<Role, String>,
    #[serde(default)]
    pub routes: Vec<RouteRule>,
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

/// Marketplace frontend routes shipped with the client.
pub const MARKETPLACE_ROUTES: &str = include_str!("../routes.json");

#[derive(Debug, Clone)]
pub struct RouteGuard {
    table: RouteTable,
    redirects: DashboardRedirectMap,
    login_path: String,
}

impl RouteGuard {
    pub fn new(table: RouteTable, redirects: DashboardRedirectMap) -> Self {
        Self {
            table,
            redirects,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    pub fn from_config(config: NavigationConfig) -> Result<Self, NavigationError> {
        if !config.login_path.starts_with('/') {
            return Err(NavigationError::InvalidPath(config.login_path));
        }
        let table = RouteTable::new(config.routes)?;
        let redirects = DashboardRedirectMap::new(config.dashboards)?;
        let guard = Self::new(table, redirects).with_login_path(config.login_path);
        guard.check_landing_paths()?;
        Ok(guard)
    }

    /// Every role must be able to render its own landing path, otherwise a
    /// forbidden redirect would loop.
    fn check_landing_paths(&self) -> Result<(), NavigationError> {
        for role in Role::ALL {
            let landing = self.redirects.landing_path(role);
            if let Some(rule) = self.table.lookup(landing) {
                if !role_permitted(&Protection::from(rule), role) {
                    return Err(NavigationError::LandingNotReachable(role));
                }
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, NavigationError> {
        let config: NavigationConfig = serde_json::from_str(json)?;
        Self::from_config(config)
    }

    pub fn marketplace() -> Result<Self, NavigationError> {
        Self::from_json(MARKETPLACE_ROUTES)
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Decide for an explicitly protected subtree.
    pub fn decide(&self, state: &AuthState, requested: &str, protection: &Protection) -> GuardDecision {
        let user = match state {
            AuthState::Uninitialized | AuthState::Initializing => return GuardDecision::Loading,
            AuthState::Ready(user) => user.as_ref(),
        };

        let Some(user) = user else {
            // A role-restricted subtree is never shown anonymously.
            if !protection.require_auth && !protection.restricts_roles() {
                return GuardDecision::Render;
            }
            let login = protection.login_path.as_deref().unwrap_or(&self.login_path);
            return GuardDecision::Redirect(Redirect {
                to: login.to_string(),
                return_to: Some(requested.to_string()),
                reason: RedirectReason::Unauthenticated,
            });
        };

        if role_permitted(protection, user.role) {
            GuardDecision::Render
        } else {
            debug!(path = requested, role = %user.role, "role not allowed; redirecting to dashboard");
            GuardDecision::Redirect(Redirect {
                to: self.redirects.landing_path(user.role).to_string(),
                return_to: None,
                reason: RedirectReason::Forbidden,
            })
        }
    }

    /// Decide using the route table. Paths without a rule are public and
    /// render immediately.
    pub fn guard_path(&self, state: &AuthState, requested: &str) -> GuardDecision {
        match self.table.lookup(requested) {
            Some(rule) => self.decide(state, requested, &Protection::from(rule)),
            None => GuardDecision::Render,
        }
    }

    /// Like [`guard_path`](Self::guard_path), but waits (bounded) for the
    /// store to finish initializing instead of returning `Loading`.
    pub async fn resolve(&self, store: &AuthStateStore, requested: &str, timeout: Duration) -> GuardDecision {
        let Some(rule) = self.table.lookup(requested) else {
            return GuardDecision::Render;
        };

        let mut state = store.current();
        if !state.is_resolved() {
            state = AuthState::Ready(store.wait_until_ready(timeout).await);
        }

        self.decide(&state, requested, &Protection::from(rule))
    }
}
