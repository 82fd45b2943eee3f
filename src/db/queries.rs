use anyhow::Result;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::db::models::{GiftCardRow, GiftCardStatus, NewGiftCard};

pub async fn insert_gift_card(pool: &Pool<Sqlite>, card: &NewGiftCard) -> Result<()> {
    sqlx::query(
        "INSERT INTO gift_cards (id, amount, payment_hash, status, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&card.id)
    .bind(card.amount)
    .bind(&card.payment_hash)
    .bind(GiftCardStatus::Pending.as_str())
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Single conditional update, so concurrent polls for the same payment hash
/// cannot overwrite each other's code.
pub async fn complete_gift_card(pool: &Pool<Sqlite>, payment_hash: &str, code: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE gift_cards SET status = ?, code = ?
         WHERE payment_hash = ? AND status = ?",
    )
    .bind(GiftCardStatus::Completed.as_str())
    .bind(code)
    .bind(payment_hash)
    .bind(GiftCardStatus::Pending.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get_gift_card_by_payment_hash(
    pool: &Pool<Sqlite>,
    payment_hash: &str,
) -> Result<Option<GiftCardRow>> {
    let card = sqlx::query_as::<_, GiftCardRow>(
        "SELECT id, amount, payment_hash, code, status, created_at
         FROM gift_cards WHERE payment_hash = ?",
    )
    .bind(payment_hash)
    .fetch_optional(pool)
    .await?;

    Ok(card)
}
