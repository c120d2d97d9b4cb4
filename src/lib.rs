//! chttpd - minimal HTTP message codec and static file daemon
//!
//! The library exposes the whitespace-token HTTP codec under [`http`] and
//! the thread-per-connection style daemon under [`server`].

pub mod config;
pub mod http;
pub mod server;
