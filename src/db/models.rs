use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftCardStatus {
    Pending,
    Completed,
}

impl GiftCardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for GiftCardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GiftCardStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(anyhow::anyhow!("unknown gift card status {other:?}")),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GiftCardRow {
    pub id: String,
    pub amount: i64,
    pub payment_hash: String,
    pub code: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCard {
    pub id: String,
    /// Face value in EUR
    pub amount: i64,
    pub payment_hash: String,
    pub code: Option<String>,
    pub status: GiftCardStatus,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<GiftCardRow> for GiftCard {
    type Error = anyhow::Error;

    fn try_from(row: GiftCardRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            amount: row.amount,
            payment_hash: row.payment_hash,
            code: row.code,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewGiftCard {
    pub id: String,
    pub amount: i64,
    pub payment_hash: String,
}
