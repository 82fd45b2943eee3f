pub mod models;
pub mod queries;
pub mod repository;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Pool, Sqlite, SqlitePool};
use std::str::FromStr;

use models::{GiftCard, NewGiftCard};

pub use repository::SqliteGiftCardStore;

pub async fn init_pool(database_url: &str) -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;
    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Gift-card orders keyed by the payment hash of their invoice.
#[async_trait]
pub trait GiftCardStore: Send + Sync {
    async fn create(&self, card: &NewGiftCard) -> Result<()>;

    /// Move the order to `completed` with `code`, unless it already is.
    /// Returns the stored order, whose code is the first one ever written.
    async fn complete(&self, payment_hash: &str, code: &str) -> Result<Option<GiftCard>>;

    async fn get_by_payment_hash(&self, payment_hash: &str) -> Result<Option<GiftCard>>;
}
