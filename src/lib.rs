//! Asynchronous client for the steam-trader.com trading API.
//!
//! [`SteamTraderClient`] exposes one method per remote endpoint. Transport
//! failures are logged and collapse to `None`; application errors come back
//! as a decoded [`ApiResponse`] whose `success` field is false.

pub mod adapters;
pub mod client;
pub mod config;
pub mod domain;
pub mod ports;

pub use client::SteamTraderClient;
pub use config::ClientConfig;
pub use domain::{ApiMethod, ApiResponse, Params, TraderError};
