//! Pre-flight reachability check for the auxiliary key-value service.
//!
//! When authority processing is enabled the ingest tool needs Redis for every
//! batch, so the run checks it once up front and aborts if it is unreachable.

use async_trait::async_trait;
use log::info;

use crate::config::PREFLIGHT_TIMEOUT;
use crate::error_handling::PreflightError;

/// A one-shot check performed after the lock is acquired and before any
/// batch is written. Failure is fatal to the run.
#[async_trait]
pub trait Preflight: Send + Sync {
    /// What is being checked, for logs.
    fn target(&self) -> &str;

    async fn check(&self) -> Result<(), PreflightError>;
}

/// Sends `PING` to a Redis server.
#[derive(Debug, Clone)]
pub struct RedisPreflight {
    url: String,
}

impl RedisPreflight {
    pub fn new(url: impl Into<String>) -> Self {
        RedisPreflight { url: url.into() }
    }

    fn unreachable(&self, e: redis::RedisError) -> PreflightError {
        PreflightError::Unreachable {
            target: format!("redis at {}", self.url),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl Preflight for RedisPreflight {
    fn target(&self) -> &str {
        &self.url
    }

    async fn check(&self) -> Result<(), PreflightError> {
        info!("Authorities processing is enabled, checking redis at {}", self.url);
        let client = redis::Client::open(self.url.as_str()).map_err(|e| self.unreachable(e))?;

        let ping = async {
            let mut conn = client.get_multiplexed_async_connection().await?;
            let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<String, redis::RedisError>(pong)
        };

        match tokio::time::timeout(PREFLIGHT_TIMEOUT, ping).await {
            Ok(Ok(pong)) => {
                info!("Redis at {} answered {}", self.url, pong);
                Ok(())
            }
            Ok(Err(e)) => Err(self.unreachable(e)),
            Err(_) => Err(PreflightError::Timeout {
                target: format!("redis at {}", self.url),
                secs: PREFLIGHT_TIMEOUT.as_secs(),
            }),
        }
    }
}
