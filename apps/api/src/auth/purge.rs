//! Periodic cleanup of blacklist entries whose tokens have expired anyway.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::auth::tokens::TokenManager;

/// Spawns a task that calls `purge_expired_blacklist` every `every`.
/// The first run happens immediately. A failed run is logged and the loop
/// carries on; the task only ends when aborted or the runtime shuts down.
pub fn spawn_blacklist_purge(tokens: Arc<TokenManager>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = every.as_secs(), "blacklist purge job started");

        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match tokens.purge_expired_blacklist().await {
                Ok(removed) => info!(removed, "expired blacklisted tokens purged"),
                Err(e) => error!("Blacklist purge failed: {e}"),
            }
        }
    })
}
