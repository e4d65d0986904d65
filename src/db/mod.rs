pub mod cache;
pub mod postgres;
pub mod users;

pub use cache::{Cache, CacheKey, CacheTtls};
pub use postgres::{create_pool, PgUserDirectory};
pub use users::{InMemoryUserDirectory, UserDirectory};
