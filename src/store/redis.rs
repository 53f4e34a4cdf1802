//! Cache backed by a Redis-compatible server

use super::{CacheStore, StoreError, StoreResult};
use crate::protocol::{RespConnection, RespError, RespValue};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const DEFAULT_PORT: u16 = 6379;

impl From<RespError> for StoreError {
    fn from(err: RespError) -> Self {
        match err {
            RespError::Io(e) => StoreError::Io(e),
            RespError::Protocol(msg) | RespError::InvalidEncoding(msg) => StoreError::Protocol(msg),
        }
    }
}

/// Cache client holding a single lazily opened connection.
///
/// A connection that fails, or whose call is cancelled, is discarded and
/// reopened by the next call. Calls are not retried.
#[derive(Debug)]
pub struct RedisCache {
    address: String,
    connection: Mutex<Option<RespConnection>>,
}

impl RedisCache {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connection: Mutex::new(None),
        }
    }

    /// Parse `redis://host[:port][/db]`; the port defaults to 6379
    pub fn from_url(url: &str) -> StoreResult<Self> {
        let rest = url
            .strip_prefix("redis://")
            .ok_or_else(|| StoreError::Unavailable(format!("unsupported cache url: {url}")))?;
        let authority = rest.split('/').next().unwrap_or_default();
        if authority.is_empty() {
            return Err(StoreError::Unavailable(format!("cache url has no host: {url}")));
        }
        let address = if authority.rsplit_once(':').is_some_and(|(_, port)| port.parse::<u16>().is_ok()) {
            authority.to_string()
        } else {
            format!("{authority}:{DEFAULT_PORT}")
        };
        Ok(Self::new(address))
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// The connection is out of the slot while a call is in flight and only
    /// goes back once its reply has been read. A call cancelled mid-way, by a
    /// timeout for instance, drops the connection with it.
    async fn call(&self, parts: &[&str]) -> StoreResult<RespValue> {
        let mut slot = self.connection.lock().await;
        let mut conn = match slot.take() {
            Some(conn) => conn,
            None => {
                debug!(address = %self.address, "connecting to cache");
                RespConnection::connect(self.address.as_str())
                    .await
                    .map_err(|e| StoreError::Unavailable(format!("{}: {}", self.address, e)))?
            }
        };

        match conn.call(parts.iter().copied()).await {
            Ok(reply) => {
                *slot = Some(conn);
                match reply {
                    RespValue::Error(message) => Err(StoreError::OperationFailed(message)),
                    reply => Ok(reply),
                }
            }
            Err(err) => {
                warn!(address = %self.address, error = %err, "dropping cache connection");
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.call(&["GET", key]).await?.as_text()?)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let seconds = ttl.as_secs().max(1).to_string();
        self.call(&["SET", key, value, "EX", seconds.as_str()]).await?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        Ok(self.call(&["INCR", key]).await?.as_integer()?)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        let seconds = ttl.as_secs().max(1).to_string();
        Ok(self.call(&["EXPIRE", key, seconds.as_str()]).await?.as_integer()? == 1)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.call(&["PING"]).await?;
        Ok(())
    }
}
