use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use shared_models::DoctorId;

/// Lifetime of cached doctor snapshots, in seconds.
pub const CACHE_TTL_SECONDS: u64 = 300;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Redis-backed cache for doctor reads. Without a configured redis URL
/// every lookup is a miss and invalidation is a no-op. Read failures
/// degrade to misses; only write-path invalidation failures surface to
/// the caller.
#[derive(Clone)]
pub struct AvailabilityCache {
    pool: Option<Pool>,
}

impl AvailabilityCache {
    pub async fn connect(redis_url: Option<&str>) -> Self {
        let url = match redis_url {
            Some(url) => url,
            None => {
                info!("REDIS_URL not set, doctor cache disabled");
                return Self { pool: None };
            }
        };

        let cfg = Config::from_url(url);
        let pool = match cfg.create_pool(Some(Runtime::Tokio1)) {
            Ok(pool) => pool,
            Err(e) => {
                warn!("Failed to create Redis pool, doctor cache disabled: {}", e);
                return Self { pool: None };
            }
        };

        // Probe once so a bad URL shows up in the startup log
        match pool.get().await {
            Ok(mut conn) => {
                let ping: Result<String, redis::RedisError> =
                    redis::cmd("PING").query_async(&mut conn).await;
                match ping {
                    Ok(_) => info!("Doctor cache connected"),
                    Err(e) => warn!("Redis ping failed: {}", e),
                }
            }
            Err(e) => warn!("Redis unreachable at startup: {}", e),
        }

        Self { pool: Some(pool) }
    }

    pub fn disabled() -> Self {
        Self { pool: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    pub fn doctor_details_key(doctor_id: &DoctorId) -> String {
        format!("doctor_details:{}", doctor_id)
    }

    pub fn doctor_availability_key(doctor_id: &DoctorId) -> String {
        format!("doctor_availability:{}", doctor_id)
    }

    /// Returns the cached value, or `None` on a miss, a disabled cache or
    /// any read failure.
    pub async fn get_json(&self, key: &str) -> Option<Value> {
        let pool = self.pool.as_ref()?;

        let mut conn = match pool.get().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Cache read skipped, no connection: {}", e);
                return None;
            }
        };

        let cached: Result<Option<String>, redis::RedisError> = conn.get(key).await;
        match cached {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(value) => {
                    debug!("Cache hit for {}", key);
                    Some(value)
                }
                Err(e) => {
                    warn!("Dropping undecodable cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    /// Best-effort populate with the standard TTL. The caller already holds
    /// the value from the store, so failures are only logged.
    pub async fn put_json(&self, key: &str, value: &Value) {
        let pool = match self.pool.as_ref() {
            Some(pool) => pool,
            None => return,
        };

        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Skipping cache write for {}: {}", key, e);
                return;
            }
        };

        let mut conn = match pool.get().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Cache write skipped, no connection: {}", e);
                return;
            }
        };

        let written: Result<(), redis::RedisError> =
            conn.set_ex(key, payload, CACHE_TTL_SECONDS).await;
        if let Err(e) = written {
            warn!("Cache write failed for {}: {}", key, e);
        } else {
            debug!("Cached {} for {}s", key, CACHE_TTL_SECONDS);
        }
    }

    /// Drops both snapshots for a doctor. Runs before any write to the
    /// doctor row reports success; with redis configured, a failure here
    /// must fail that write.
    pub async fn invalidate_doctor(&self, doctor_id: &DoctorId) -> Result<(), CacheError> {
        if self.pool.is_none() {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        let keys = [
            Self::doctor_availability_key(doctor_id),
            Self::doctor_details_key(doctor_id),
        ];
        let _: () = conn.del(&keys[..]).await?;

        debug!("Invalidated cache entries for doctor {}", doctor_id);
        Ok(())
    }

    async fn get_connection(&self) -> Result<Connection, CacheError> {
        let pool = self.pool.as_ref().ok_or_else(|| {
            CacheError::RedisError(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "Cache disabled",
                "No Redis pool configured".to_string(),
            )))
        })?;

        pool.get().await.map_err(|e| {
            CacheError::RedisError(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "Failed to get Redis connection",
                e.to_string(),
            )))
        })
    }
}
