//! itemd - In-memory item service
//!
//! Core library for the HTTP layer, item store and JSON API.

pub mod api;
pub mod config;
pub mod http;
pub mod model;
pub mod server;
pub mod store;
