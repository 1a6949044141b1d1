//! HTTP client for the Coolify API

mod client;
mod factory;

pub use client::CoolifyClient;
pub use factory::CoolifyClientFactory;
