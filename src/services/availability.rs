use crate::{
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        display_name, AccessTier, ActiveServiceSet, AvailabilityItem, ProviderAvailability,
        ProvidersValue, Region, RegionProviders, TitleRef,
    },
    services::{normalizer::map_provider_name, providers::StreamingProvider},
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Resolves which of a caller's active services carry a title in a region
///
/// Provider listings are read through the cache; the merge against the caller's
/// services is recomputed on every call.
#[derive(Clone)]
pub struct AvailabilityResolver {
    cache: Cache,
    source: Arc<dyn StreamingProvider>,
}

impl AvailabilityResolver {
    pub fn new(cache: Cache, source: Arc<dyn StreamingProvider>) -> Self {
        Self { cache, source }
    }

    /// Full provider listing for a title, cache first
    pub async fn listing(
        &self,
        title: TitleRef,
        cancel: &CancellationToken,
    ) -> AppResult<ProvidersValue> {
        let key = CacheKey::providers(title);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::Cancelled),
            result = self.cache.fetch_through(&key, || self.source.fetch_providers(title)) => result,
        }
    }

    /// Resolves one title. Upstream failures and cancellation are returned as errors.
    pub async fn resolve(
        &self,
        title: TitleRef,
        region: &Region,
        active: &ActiveServiceSet,
        cancel: &CancellationToken,
    ) -> AppResult<AvailabilityItem> {
        let listing = self.listing(title, cancel).await?;
        Ok(match_providers(listing.region(region.as_str()), active))
    }

    /// Like [`resolve`](Self::resolve), but any failure yields the unavailable item
    pub async fn resolve_or_degrade(
        &self,
        title: TitleRef,
        region: &Region,
        active: &ActiveServiceSet,
        cancel: &CancellationToken,
    ) -> AvailabilityItem {
        match self.resolve(title, region, active, cancel).await {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(
                    title = %title,
                    region = %region,
                    error = %e,
                    "Availability lookup failed, returning empty result"
                );
                AvailabilityItem::unavailable(active)
            }
        }
    }
}

struct ProviderMatch {
    code: &'static str,
    logo: Option<String>,
    tiers: Vec<AccessTier>,
}

/// Merges one region's provider buckets against the caller's active services.
///
/// Providers are matched by normalized name; unknown names and inactive services are
/// skipped. Output is sorted by display name, tiers by [`AccessTier::PRIORITY`].
pub fn match_providers(
    listing: Option<&RegionProviders>,
    active: &ActiveServiceSet,
) -> AvailabilityItem {
    let Some(listing) = listing else {
        return AvailabilityItem::unavailable(active);
    };

    let buckets = [
        (AccessTier::Subscription, &listing.flatrate),
        (AccessTier::Free, &listing.free),
        (AccessTier::Ads, &listing.ads),
    ];

    let mut matches: HashMap<&'static str, ProviderMatch> = HashMap::new();

    for (tier, entries) in buckets {
        for entry in entries {
            let Some(code) = map_provider_name(&entry.provider_name) else {
                continue;
            };
            if !active.contains(code) {
                continue;
            }

            let found = matches.entry(code).or_insert_with(|| ProviderMatch {
                code,
                logo: None,
                tiers: Vec::new(),
            });
            if !found.tiers.contains(&tier) {
                found.tiers.push(tier);
            }
            if found.logo.is_none() {
                found.logo = entry.logo_path.clone().filter(|l| !l.is_empty());
            }
        }
    }

    let unmatched_user_services = active
        .codes()
        .filter(|code| !matches.contains_key(*code))
        .map(str::to_string)
        .collect();

    let mut providers: Vec<ProviderAvailability> = matches
        .into_values()
        .map(|found| {
            let mut access: Vec<AccessTier> = AccessTier::PRIORITY
                .into_iter()
                .filter(|tier| found.tiers.contains(tier))
                .collect();
            if access.is_empty() {
                access.push(AccessTier::Subscription);
            }

            ProviderAvailability {
                code: found.code.to_string(),
                name: display_name(found.code).to_string(),
                logo: found.logo,
                link: listing.link.clone(),
                access,
            }
        })
        .collect();

    providers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)));

    AvailabilityItem {
        providers,
        unmatched_user_services,
    }
}
