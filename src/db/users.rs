use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{error::AppResult, models::UserRecord};

/// Read access to user records owned by the profile service
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns `None` for users that have no stored record yet
    async fn find_user(&self, user_id: &str) -> AppResult<Option<UserRecord>>;
}

/// User records held in process memory
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user_id: impl Into<String>, record: UserRecord) {
        self.users.write().await.insert(user_id.into(), record);
    }
}

#[async_trait::async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, user_id: &str) -> AppResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }
}
