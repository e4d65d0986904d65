use std::sync::Arc;

use crate::{
    db::{Cache, InMemoryUserDirectory, UserDirectory},
    error::{AppError, AppResult},
    models::UserRecord,
    services::{AvailabilityResolver, StreamingProvider},
};

/// Shared application state
///
/// `provider` is `None` when TMDb credentials are missing; lookups then answer 503.
#[derive(Clone)]
pub struct AppState {
    pub cache: Cache,
    pub provider: Option<Arc<dyn StreamingProvider>>,
    pub resolver: Option<AvailabilityResolver>,
    pub users: Arc<dyn UserDirectory>,
    pub server_region: Option<String>,
}

impl AppState {
    pub fn new(
        cache: Cache,
        provider: Option<Arc<dyn StreamingProvider>>,
        users: Arc<dyn UserDirectory>,
        server_region: Option<String>,
    ) -> Self {
        let resolver = provider
            .clone()
            .map(|source| AvailabilityResolver::new(cache.clone(), source));

        Self {
            cache,
            provider,
            resolver,
            users,
            server_region,
        }
    }

    /// State with no cache, no upstream and an empty user directory
    pub fn empty() -> Self {
        Self::new(
            Cache::disabled(),
            None,
            Arc::new(InMemoryUserDirectory::new()),
            None,
        )
    }

    pub fn resolver(&self) -> AppResult<&AvailabilityResolver> {
        self.resolver
            .as_ref()
            .ok_or_else(|| AppError::Unavailable("availability unavailable".to_string()))
    }

    pub fn provider(&self) -> AppResult<&dyn StreamingProvider> {
        self.provider
            .as_deref()
            .ok_or_else(|| AppError::Unavailable("search unavailable".to_string()))
    }

    /// Unknown users behave like a fresh record with no services
    pub async fn load_user(&self, user_id: &str) -> AppResult<UserRecord> {
        Ok(self.users.find_user(user_id).await?.unwrap_or_default())
    }
}
