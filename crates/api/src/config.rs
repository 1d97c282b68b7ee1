//! Runtime configuration (environment-driven).

use std::net::SocketAddr;

use anyhow::{Context, bail};
use chrono::Duration;
use tracing::warn;

use motorhub_core::IdentityId;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub session_ttl: Duration,
    /// Identity registered as admin at startup (in-memory store only).
    pub bootstrap_admin: Option<IdentityId>,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = lookup("MOTORHUB_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("MOTORHUB_BIND_ADDR must be a socket address")?;

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let ttl_secs = match lookup("MOTORHUB_SESSION_TTL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("MOTORHUB_SESSION_TTL_SECS is not an integer: '{raw}'"))?,
            None => DEFAULT_SESSION_TTL_SECS,
        };
        if ttl_secs <= 0 {
            bail!("MOTORHUB_SESSION_TTL_SECS must be positive (got {ttl_secs})");
        }

        let bootstrap_admin = lookup("MOTORHUB_BOOTSTRAP_ADMIN")
            .map(IdentityId::parse)
            .transpose()
            .context("MOTORHUB_BOOTSTRAP_ADMIN must be a non-empty identity id")?;

        Ok(Self {
            bind_addr,
            jwt_secret,
            session_ttl: Duration::seconds(ttl_secs),
            bootstrap_admin,
        })
    }

    /// Configuration for tests: fixed secret, ephemeral port.
    pub fn for_tests(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
            bootstrap_admin: None,
        }
    }
}
