//! TCP listener and graceful shutdown.

pub mod listener;
pub mod shutdown;

pub use listener::Server;
