//! `KeepTouch` HTTP server.
//!
//! Wires the core plan and lead domain to outbound providers and a lead
//! repository, and serves the JSON API under `/api/*`, the collect-lead
//! function, and the marketing pages at `/`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod providers;
#[cfg(feature = "postgres")]
pub mod repository;
pub mod routes;
pub mod state;
