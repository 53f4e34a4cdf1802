//! RESP client protocol
//!
//! Wire codec and a TCP connection used by the Redis-backed cache.

pub mod connection;
pub mod resp;

pub use connection::RespConnection;
pub use resp::{RespError, RespResult, RespValue};
