use crate::{
    error::{AppError, AppResult},
    models::{ActiveServiceSet, AvailabilityItem, BatchItemRequest, Region, TitleRef},
    services::availability::AvailabilityResolver,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

pub const MAX_BATCH_SIZE: usize = 500;

/// Upstream-bound resolutions allowed in flight per batch
pub const MAX_CONCURRENT_RESOLUTIONS: usize = 10;

/// Validates every item before any work starts.
///
/// Duplicates are dropped, keeping first-seen order.
pub fn validate_batch(items: &[BatchItemRequest]) -> AppResult<Vec<TitleRef>> {
    if items.is_empty() {
        return Err(AppError::InvalidInput(
            "items array cannot be empty".to_string(),
        ));
    }
    if items.len() > MAX_BATCH_SIZE {
        return Err(AppError::InvalidInput(format!(
            "batch size exceeds maximum of {}",
            MAX_BATCH_SIZE
        )));
    }

    let mut seen = HashSet::with_capacity(items.len());
    let mut titles = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let title = TitleRef::parse(item.id, &item.media_type).map_err(|e| match e {
            AppError::InvalidInput(msg) => {
                AppError::InvalidInput(format!("items[{}]: {}", index, msg))
            }
            other => other,
        })?;
        if seen.insert(title) {
            titles.push(title);
        }
    }

    Ok(titles)
}

/// Resolves every title concurrently, at most [`MAX_CONCURRENT_RESOLUTIONS`] at a time.
///
/// Never fails: an item whose lookup fails, is cancelled or panics is reported as
/// unavailable. Returns only after every spawned task has finished.
pub async fn resolve_batch(
    resolver: &AvailabilityResolver,
    titles: &[TitleRef],
    region: &Region,
    active: &ActiveServiceSet,
    cancel: &CancellationToken,
) -> BTreeMap<String, AvailabilityItem> {
    tracing::info!(
        items = titles.len(),
        region = %region,
        active_services = active.len(),
        "Resolving availability batch"
    );

    let gate = Arc::new(Semaphore::new(MAX_CONCURRENT_RESOLUTIONS));
    let active_shared = Arc::new(active.clone());
    let (tx, mut rx) = mpsc::channel(titles.len().max(1));

    let mut handles = Vec::with_capacity(titles.len());

    for &title in titles {
        let resolver = resolver.clone();
        let region = region.clone();
        let active = Arc::clone(&active_shared);
        let gate = Arc::clone(&gate);
        let cancel = cancel.clone();
        let tx = tx.clone();

        handles.push(tokio::spawn(async move {
            let item = tokio::select! {
                biased;
                _ = cancel.cancelled() => AvailabilityItem::unavailable(&active),
                permit = gate.acquire_owned() => match permit {
                    Ok(_permit) => {
                        resolver
                            .resolve_or_degrade(title, &region, &active, &cancel)
                            .await
                    }
                    Err(_) => AvailabilityItem::unavailable(&active),
                },
            };

            // Receiver only goes away if the collector itself was dropped
            let _ = tx.send((title.result_key(), item)).await;
        }));
    }

    // Collector ends once every task has dropped its sender
    drop(tx);

    let mut results = BTreeMap::new();
    while let Some((key, item)) = rx.recv().await {
        results.insert(key, item);
    }

    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Batch resolution task failed");
        }
    }

    for title in titles {
        results
            .entry(title.result_key())
            .or_insert_with(|| AvailabilityItem::unavailable(active));
    }

    tracing::info!(results = results.len(), "Availability batch resolved");

    results
}
