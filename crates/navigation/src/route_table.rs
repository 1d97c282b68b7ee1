//! Declarative path → access rule table.

use serde::{Deserialize, Serialize};

use motorhub_auth::Role;

use crate::NavigationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMatch {
    /// Only the path itself.
    #[default]
    Exact,
    /// The path and everything below it (segment-aligned).
    Prefix,
}

fn default_true() -> bool {
    true
}

/// Access rule for one navigable path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
    pub path: String,

    #[serde(default, rename = "match")]
    pub matching: PathMatch,

    #[serde(default = "default_true")]
    pub require_auth: bool,

    /// `None` (or empty) means any authenticated user.
    #[serde(default)]
    pub allowed_roles: Option<Vec<Role>>,
}

impl RouteRule {
    pub fn exact(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            matching: PathMatch::Exact,
            require_auth: true,
            allowed_roles: None,
        }
    }

    pub fn prefix(path: impl Into<String>) -> Self {
        Self {
            matching: PathMatch::Prefix,
            ..Self::exact(path)
        }
    }

    pub fn roles(mut self, roles: &[Role]) -> Self {
        self.allowed_roles = Some(roles.to_vec());
        self
    }

    pub fn public(mut self) -> Self {
        self.require_auth = false;
        self
    }

    fn matches(&self, path: &str) -> bool {
        match self.matching {
            PathMatch::Exact => self.path == path,
            PathMatch::Prefix => {
                if self.path == "/" {
                    return true;
                }
                path == self.path
                    || path
                        .strip_prefix(self.path.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

/// Normalise a location for matching: drop query/fragment, collapse repeated
/// slashes, drop any trailing slash, lowercase.
pub fn normalize_path(requested: &str) -> String {
    let end = requested.find(['?', '#']).unwrap_or(requested.len());
    let segments: Vec<&str> = requested[..end].split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/")).to_lowercase()
}

/// Immutable rule table, loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>) -> Result<Self, NavigationError> {
        let mut normalized: Vec<RouteRule> = Vec::with_capacity(rules.len());

        for mut rule in rules {
            if !rule.path.starts_with('/') {
                return Err(NavigationError::InvalidPath(rule.path));
            }
            rule.path = normalize_path(&rule.path);

            if normalized
                .iter()
                .any(|r| r.path == rule.path && r.matching == rule.matching)
            {
                return Err(NavigationError::DuplicateRule(rule.path));
            }
            normalized.push(rule);
        }

        Ok(Self { rules: normalized })
    }

    pub fn from_json(json: &str) -> Result<Self, NavigationError> {
        let rules: Vec<RouteRule> = serde_json::from_str(json)?;
        Self::new(rules)
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Find the rule governing `requested`.
    ///
    /// Exact rules win over prefix rules; among prefix rules the longest
    /// wins. `None` means the path is public.
    pub fn lookup(&self, requested: &str) -> Option<&RouteRule> {
        let path = normalize_path(requested);

        self.rules
            .iter()
            .find(|r| r.matching == PathMatch::Exact && r.matches(&path))
            .or_else(|| {
                self.rules
                    .iter()
                    .filter(|r| r.matching == PathMatch::Prefix && r.matches(&path))
                    .max_by_key(|r| r.path.len())
            })
    }
}
