//! HTTP API: authentication, role guards, and the marketplace routes behind them.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
