use anyhow::Result;
use moka::future::Cache;
use sea_orm::Database;
use std::time::Duration;
use crate::schemas::AppState;

const DEFAULT_TOKEN_CACHE_TTL_SECS: u64 = 300;

/// Initialize application state for the given database
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    let ttl = token_cache_ttl();
    tracing::debug!("Token cache TTL: {:?}", ttl);
    let token_cache = Cache::builder()
        .max_capacity(10_000)
        .time_to_live(ttl)
        .build();

    Ok(AppState { db, token_cache })
}

/// Token cache lifetime from `TOKEN_CACHE_TTL_SECS`, defaulting to five minutes
pub fn token_cache_ttl() -> Duration {
    let secs = std::env::var("TOKEN_CACHE_TTL_SECS")
        .ok()
        .and_then(|value| match value.parse::<u64>() {
            Ok(secs) => Some(secs),
            Err(e) => {
                tracing::warn!("Ignoring invalid TOKEN_CACHE_TTL_SECS '{}': {}", value, e);
                None
            }
        })
        .unwrap_or(DEFAULT_TOKEN_CACHE_TTL_SECS);
    Duration::from_secs(secs)
}
