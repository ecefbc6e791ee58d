//! Subscription payload fetching.
//!
//! Subscription endpoints are third-party and flaky; the contract is a
//! fixed retry budget and silent degradation. A source whose fetch never
//! succeeds simply contributes zero nodes.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::common::SubError;

/// Fixed per-source attempt budget.
pub const FETCH_ATTEMPTS: usize = 5;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP client: connection reuse across concurrent source tasks,
/// per-attempt timeouts so the retry loop always terminates.
pub fn build_client() -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Fetch one subscription payload. Every failure is swallowed; after the
/// last failed attempt the caller gets `None` and moves on.
pub async fn fetch_payload(client: &Client, url: &str) -> Option<String> {
    for attempt in 1..=FETCH_ATTEMPTS {
        match try_fetch(client, url).await {
            Ok(body) => return Some(body),
            Err(e) => {
                debug!(url, attempt, error = %e, "subscription fetch attempt failed");
            }
        }
    }
    warn!(url, attempts = FETCH_ATTEMPTS, "subscription unreachable, source skipped");
    None
}

async fn try_fetch(client: &Client, url: &str) -> Result<String, SubError> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}
