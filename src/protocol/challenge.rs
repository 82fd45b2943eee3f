use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

use super::Tag;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    #[error("unknown or already used k1")]
    Unknown,
    #[error("k1 expired")]
    Expired,
    #[error("k1 was issued for {issued}, not {requested}")]
    WrongTag { issued: Tag, requested: Tag },
}

struct Challenge {
    tag: Tag,
    issued_at: Instant,
}

/// Outstanding `k1` tokens, each good for exactly one callback.
pub struct ChallengeStore {
    ttl: Duration,
    issued: Mutex<HashMap<String, Challenge>>,
}

impl ChallengeStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            issued: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a fresh 32-byte token for a document of the given tag.
    pub async fn issue(&self, tag: Tag) -> String {
        let mut issued = self.issued.lock().await;
        let now = Instant::now();
        issued.retain(|_, challenge| now.duration_since(challenge.issued_at) < self.ttl);

        loop {
            let k1 = hex::encode(rand::random::<[u8; 32]>());
            if !issued.contains_key(&k1) {
                issued.insert(k1.clone(), Challenge { tag, issued_at: now });
                return k1;
            }
        }
    }

    /// Consume `k1`. The token is gone afterwards whether or not it was
    /// valid for this callback.
    pub async fn redeem(&self, k1: &str, tag: Tag) -> Result<(), ChallengeError> {
        let challenge = self
            .issued
            .lock()
            .await
            .remove(k1)
            .ok_or(ChallengeError::Unknown)?;

        if challenge.issued_at.elapsed() >= self.ttl {
            return Err(ChallengeError::Expired);
        }
        if challenge.tag != tag {
            return Err(ChallengeError::WrongTag {
                issued: challenge.tag,
                requested: tag,
            });
        }
        Ok(())
    }

    pub async fn outstanding(&self) -> usize {
        self.issued.lock().await.len()
    }
}
