//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 wire layer with support for keep-alive connections.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The main connection handler implementing the request-response state machine
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation and parsing utilities
//! - **`response`**: HTTP response representation with builder pattern and JSON helpers
//! - **`writer`**: Serializes and writes HTTP responses to the client
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for incoming request data
//!        └──────┬──────┘
//!               │ Request received
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Route to the API handler
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```
//!
//! Malformed requests skip Processing: a 400 is written and the connection
//! closes. Idle keep-alive connections also close once shutdown begins.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use itemd::api::ApiHandler;
//! use itemd::config::ServerConfig;
//! use itemd::http::connection::Connection;
//! use itemd::server::shutdown;
//! use itemd::store::MemoryItemStore;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let handler = ApiHandler::new(Arc::new(MemoryItemStore::new()));
//!     let (_trigger, signal) = shutdown::channel();
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let mut conn = Connection::new(socket, handler.clone(), ServerConfig::default(), signal.clone());
//!         tokio::spawn(async move {
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod writer;
