//! HTTP API
//!
//! Routes are mounted twice, at the root and under `/api`. Handlers take their
//! stores from [`AppState`]; failures render as `{code, message, details?}`.

pub mod error;
pub mod handler;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use server::{router, HttpServer};
pub use state::AppState;
