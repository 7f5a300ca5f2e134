//! Per-client fixed-window rate limiting.

use std::{collections::HashMap, net::IpAddr, sync::Arc};

use tokio::{sync::Mutex, time::Instant};

use crate::config::RateLimit;

/// Number of tracked clients above which expired windows are pruned.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Counts requests per client IP in fixed windows.
///
/// Every request counts, including ones that later fail validation.
///
/// Only expired windows are pruned, so the map can hold more than 1024 clients
/// while that many are active within one window.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limit: RateLimit,
    windows: Arc<Mutex<HashMap<IpAddr, Window>>>,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Record a request from `client`; `false` if it exceeds the limit.
    pub async fn check(&self, client: IpAddr) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        if windows.len() >= PRUNE_THRESHOLD {
            let window = self.limit.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.limit.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        entry.count = entry.count.saturating_add(1);
        let allowed = entry.count <= self.limit.max_requests;
        if !allowed {
            tracing::debug!(%client, count = entry.count, "Rate limit exceeded");
        }
        allowed
    }
}
