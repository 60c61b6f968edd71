//! CoinLedger Server
//!
//! Runs a single ledger behind an HTTP/JSON interface. The storage strategy
//! is picked from configuration at startup.

pub mod config;
pub mod dto;
pub mod errors;
pub mod http;
pub mod metrics;
pub mod service;
pub mod state;

pub use config::ServerConfig;
pub use service::LedgerService;
