use anyhow::Result;
use sqlx::{Pool, Sqlite};
use tracing::debug;

use crate::db::{
    GiftCardStore,
    models::{GiftCard, NewGiftCard},
    queries,
};

/// SQLite implementation of GiftCardStore
#[derive(Clone)]
pub struct SqliteGiftCardStore {
    pool: Pool<Sqlite>,
}

impl SqliteGiftCardStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl GiftCardStore for SqliteGiftCardStore {
    async fn create(&self, card: &NewGiftCard) -> Result<()> {
        queries::insert_gift_card(&self.pool, card).await
    }

    async fn complete(&self, payment_hash: &str, code: &str) -> Result<Option<GiftCard>> {
        if !queries::complete_gift_card(&self.pool, payment_hash, code).await? {
            debug!(payment_hash, "gift card already completed or unknown");
        }
        self.get_by_payment_hash(payment_hash).await
    }

    async fn get_by_payment_hash(&self, payment_hash: &str) -> Result<Option<GiftCard>> {
        queries::get_gift_card_by_payment_hash(&self.pool, payment_hash)
            .await?
            .map(GiftCard::try_from)
            .transpose()
    }
}
