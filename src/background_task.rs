use actix_web::web;
use tokio::time::{interval, Duration};

use crate::{http::client::ApiClient, AppState};

/// Drops listing forms nobody touched for `ttl_minutes`, releasing their
/// previews with them.
pub async fn start_draft_purge_task(state: web::Data<AppState>, every_secs: u64, ttl_minutes: i64) {
    let mut interval = interval(Duration::from_secs(every_secs.max(1)));
    let ttl = chrono::Duration::minutes(ttl_minutes);

    loop {
        interval.tick().await;

        let purged = state.draft_handler.purge_idle(ttl);
        if purged > 0 {
            tracing::info!("Purged {} idle listing forms", purged);
        }

        let evicted = state.draft_limiter.evict_idle(ttl.to_std().unwrap_or(Duration::from_secs(3600)));
        if evicted > 0 {
            tracing::debug!("Forgot {} idle rate-limit clients", evicted);
        }
    }
}

/// Keeps the hosted API from going to sleep.
pub async fn start_wakeup_task(client: ApiClient, every_secs: u64) {
    let mut interval = interval(Duration::from_secs(every_secs.max(1)));

    loop {
        interval.tick().await;

        match client.wake_up().await {
            Ok(()) => tracing::debug!("Remote API wakeup ping ok"),
            Err(e) => tracing::warn!("Remote API wakeup ping failed: {}", e)
        }
    }
}
