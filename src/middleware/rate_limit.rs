use std::sync::Arc;

use crate::{
    config::{RateLimitConfig, ServerConfig},
    error::{AppError, Result},
    store::PlaceStore,
};

/// Admission gate applied to every inbound client message, keyed by the
/// peer's network address. Maintenance mode short-circuits before the window
/// check so a maintenance deployment rejects everything uniformly.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn PlaceStore>,
    config: RateLimitConfig,
    maintenance: bool,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn PlaceStore>, server: &ServerConfig, config: RateLimitConfig) -> Self {
        Self {
            store,
            config,
            maintenance: server.maintenance,
        }
    }

    pub async fn admit(&self, client_key: &str) -> Result<()> {
        if self.maintenance {
            return Err(AppError::Maintenance);
        }

        if self.config.skip {
            tracing::debug!("Skipping rate limit check");
            return Ok(());
        }

        let admitted = self
            .store
            .admit_request(client_key, self.config.window, self.config.max_requests)
            .await?;

        if admitted {
            Ok(())
        } else {
            tracing::info!(client_key, "Rate limit exceeded, request blocked");
            Err(AppError::RateLimitExceeded)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::MemoryStore;

    fn server(maintenance: bool) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cors_allowed_origins: vec![],
            max_concurrent_requests: 10,
            maintenance,
        }
    }

    fn limits(max_requests: u32, skip: bool) -> RateLimitConfig {
        RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests,
            skip,
        }
    }

    #[tokio::test]
    async fn admits_up_to_the_limit_then_denies() {
        let limiter = RateLimiter::new(Arc::new(MemoryStore::new()), &server(false), limits(2, false));

        assert!(limiter.admit("10.0.0.1").await.is_ok());
        assert!(limiter.admit("10.0.0.1").await.is_ok());

        let err = limiter.admit("10.0.0.1").await.unwrap_err();
        assert!(matches!(err, AppError::RateLimitExceeded));
    }

    #[tokio::test]
    async fn maintenance_denies_before_rate_limiting() {
        let limiter = RateLimiter::new(Arc::new(MemoryStore::new()), &server(true), limits(2, false));

        let err = limiter.admit("10.0.0.1").await.unwrap_err();
        assert!(matches!(err, AppError::Maintenance));
    }

    #[tokio::test]
    async fn skip_flag_bypasses_the_window() {
        let limiter = RateLimiter::new(Arc::new(MemoryStore::new()), &server(false), limits(1, true));

        for _ in 0..10 {
            assert!(limiter.admit("10.0.0.1").await.is_ok());
        }
    }
}
