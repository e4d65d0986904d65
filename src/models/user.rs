use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A streaming service the user has added to their profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct ServiceSubscription {
    pub code: String,
    pub active: bool,
}

impl ServiceSubscription {
    pub fn new(code: impl Into<String>, active: bool) -> Self {
        Self {
            code: code.into(),
            active,
        }
    }
}

/// The slice of a user record the availability engine reads
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub region: Option<String>,
    pub services: Vec<ServiceSubscription>,
}

/// Lowercase codes of the user's active subscriptions, in sorted order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveServiceSet(BTreeSet<String>);

impl ActiveServiceSet {
    pub fn from_subscriptions(services: &[ServiceSubscription]) -> Self {
        Self(
            services
                .iter()
                .filter(|s| s.active)
                .map(|s| s.code.trim().to_lowercase())
                .filter(|code| !code.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&UserRecord> for ActiveServiceSet {
    fn from(user: &UserRecord) -> Self {
        Self::from_subscriptions(&user.services)
    }
}
