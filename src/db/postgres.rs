use sqlx::{postgres::PgPoolOptions, PgPool};

use super::users::UserDirectory;
use crate::{
    error::AppResult,
    models::{ServiceSubscription, UserRecord},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// User directory over the profile service's `users` / `user_services` tables
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_user(&self, user_id: &str) -> AppResult<Option<UserRecord>> {
        let region: Option<Option<String>> =
            sqlx::query_scalar("SELECT region FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(region) = region else {
            return Ok(None);
        };

        let services: Vec<ServiceSubscription> = sqlx::query_as(
            r#"
            SELECT code, active
            FROM user_services
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(
            user_id = %user_id,
            services = services.len(),
            "Loaded user record"
        );

        Ok(Some(UserRecord { region, services }))
    }
}
