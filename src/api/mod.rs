//! JSON API over the item store.
//!
//! | Method | Path          | Success            |
//! |--------|---------------|--------------------|
//! | GET    | `/health`     | 200 `{"status":"ok"}` |
//! | GET    | `/items`      | 200 `{"items":[...],"count":N}` |
//! | POST   | `/items`      | 201 item           |
//! | GET    | `/items/{id}` | 200 item           |
//! | PUT    | `/items/{id}` | 200 item           |
//! | DELETE | `/items/{id}` | 204                |
//!
//! Other methods on `/items` and `/items/{id}` get a bodyless 405.

pub mod error;
pub mod handler;

pub use error::{ApiError, ApiResult};
pub use handler::{ApiHandler, Route};
