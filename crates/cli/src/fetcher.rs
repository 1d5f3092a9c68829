use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::timeout;
use tracing::{debug, info};

use super::types::{PrefetchedRates, RateFetcher};
use common::FetchError;

/// Fetches one rate table per selected base, at most `max_concurrent` at a time.
///
/// Each request is bounded by `request_timeout`; an elapsed request is recorded
/// as `FetchError::Timeout` for that base. Failures never stop the other
/// requests, they are handed to the graph builder which skips the base.
pub async fn fetch_all<F>(
    fetcher: Arc<F>,
    selected: &[String],
    max_concurrent: usize,
    request_timeout: Duration,
) -> PrefetchedRates
where
    F: RateFetcher,
{
    let millis = u64::try_from(request_timeout.as_millis()).unwrap_or(u64::MAX);

    let results: Vec<_> = stream::iter(selected.iter().cloned())
        .map(|base| {
            let fetcher = Arc::clone(&fetcher);
            async move {
                let result = match timeout(request_timeout, fetcher.fetch_rates(&base)).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout {
                        base: base.clone(),
                        millis,
                    }),
                };
                debug!(base = %base, ok = result.is_ok(), "Fetch finished");
                (base, result)
            }
        })
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    info!(requested = selected.len(), failed, "Rate tables fetched");

    results.into_iter().collect()
}
