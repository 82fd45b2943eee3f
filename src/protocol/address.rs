use std::fmt;
use std::str::FromStr;

use crate::error::LnurlError;

/// `localpart@domain` identifier resolved through `/.well-known/lnurlp/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightningAddress {
    pub username: String,
    pub domain: String,
}

impl LightningAddress {
    pub fn well_known_url(&self, scheme: &str) -> String {
        format!(
            "{}://{}/.well-known/lnurlp/{}",
            scheme, self.domain, self.username
        )
    }
}

/// LUD-16 localparts: `a-z0-9-_.`, at most 64 characters.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.len() <= 64
        && !username.starts_with('.')
        && username
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
}

impl FromStr for LightningAddress {
    type Err = LnurlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (username, domain) = s
            .split_once('@')
            .ok_or_else(|| LnurlError::Protocol(format!("invalid identifier {s:?}")))?;
        let username = username.to_ascii_lowercase();
        if !is_valid_username(&username) {
            return Err(LnurlError::Protocol(format!("invalid username {username:?}")));
        }
        if domain.is_empty() || domain.contains(['/', '@', '?', '#']) {
            return Err(LnurlError::Protocol(format!("invalid domain {domain:?}")));
        }
        Ok(Self {
            username,
            domain: domain.to_string(),
        })
    }
}

impl fmt::Display for LightningAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.username, self.domain)
    }
}
