use std::cmp::{max, min};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundsError {
    #[error("no amount satisfies both policies: min {min} msat > max {max} msat")]
    EmptyRange { min: u64, max: u64 },
    #[error("amount {amount} msat is out of bounds, must be between {min} and {max} msat")]
    OutOfRange { amount: u64, min: u64, max: u64 },
}

/// Intersection of the bounds a server advertises and the caller's own
/// policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountBounds {
    min: u64,
    max: u64,
}

impl AmountBounds {
    pub fn negotiate(
        remote_min: u64,
        remote_max: u64,
        local_min: u64,
        local_max: u64,
    ) -> Result<Self, BoundsError> {
        let effective_min = max(remote_min, local_min);
        let effective_max = min(remote_max, local_max);
        if effective_min > effective_max {
            return Err(BoundsError::EmptyRange {
                min: effective_min,
                max: effective_max,
            });
        }
        Ok(Self {
            min: effective_min,
            max: effective_max,
        })
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn contains(&self, amount: u64) -> bool {
        (self.min..=self.max).contains(&amount)
    }

    pub fn check(&self, amount: u64) -> Result<(), BoundsError> {
        if self.contains(amount) {
            Ok(())
        } else {
            Err(BoundsError::OutOfRange {
                amount,
                min: self.min,
                max: self.max,
            })
        }
    }
}
