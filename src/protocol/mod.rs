//! LNURL wire model shared by the server and the client.
//!
//! Field names follow the LUD documents exactly so that third-party wallets
//! can talk to either side.

pub mod address;
pub mod bounds;
pub mod challenge;
pub mod commitment;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::LnurlError;

pub use address::LightningAddress;
pub use bounds::{AmountBounds, BoundsError};
pub use challenge::{ChallengeError, ChallengeStore};
pub use commitment::{MetadataCommitment, VerificationError, invoice_matches, verify_invoice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tag {
    PayRequest,
    ChannelRequest,
    WithdrawRequest,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tag::PayRequest => "payRequest",
            Tag::ChannelRequest => "channelRequest",
            Tag::WithdrawRequest => "withdrawRequest",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Error,
}

/// `{"status": "OK"}` or `{"status": "ERROR", "reason": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: Status::Ok,
            reason: None,
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            reason: Some(reason.into()),
        }
    }
}

/// LUD-06 `payRequest` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest {
    pub callback: String,
    /// Millisatoshis
    pub max_sendable: u64,
    /// Millisatoshis
    pub min_sendable: u64,
    /// Raw JSON string, hashed as delivered.
    pub metadata: String,
    pub tag: Tag,
}

impl PayRequest {
    pub fn validate(&self) -> Result<Metadata, LnurlError> {
        if self.tag != Tag::PayRequest {
            return Err(LnurlError::Protocol(format!("invalid tag {}", self.tag)));
        }
        if self.min_sendable == 0 {
            return Err(LnurlError::Protocol("minSendable must be positive".into()));
        }
        if self.min_sendable > self.max_sendable {
            return Err(LnurlError::Protocol(format!(
                "minSendable {} exceeds maxSendable {}",
                self.min_sendable, self.max_sendable
            )));
        }
        Metadata::parse(&self.metadata)
    }
}

/// LUD-02 `channelRequest` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRequest {
    /// Not part of LUD-02; sent by this server, optional from others.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    pub tag: Tag,
    /// `nodeId@host:port`
    pub uri: String,
    pub k1: String,
    pub callback: String,
}

/// LUD-03 `withdrawRequest` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    /// Not part of LUD-03; sent by this server, optional from others.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    pub tag: Tag,
    pub callback: String,
    pub k1: String,
    pub default_description: String,
    pub min_withdrawable: u64,
    pub max_withdrawable: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayCallbackResponse {
    pub pr: String,
    #[serde(default)]
    pub routes: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityDocument {
    Pay(PayRequest),
    Channel(ChannelRequest),
    Withdraw(WithdrawRequest),
}

impl CapabilityDocument {
    /// Parse a capability document, dispatching on its `tag`.
    ///
    /// An explicit `{"status": "ERROR"}` body is reported as a callback
    /// error, anything else that does not fit a known document as a
    /// protocol error.
    pub fn parse(body: &str) -> Result<Self, LnurlError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| LnurlError::Protocol(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, LnurlError> {
        reject_error_status(&value)?;

        let tag = value
            .get("tag")
            .cloned()
            .ok_or_else(|| LnurlError::Protocol("missing tag".into()))?;
        let tag: Tag = serde_json::from_value(tag)
            .map_err(|_| LnurlError::Protocol("invalid tag".into()))?;

        let malformed = |e: serde_json::Error| LnurlError::Protocol(format!("malformed {tag}: {e}"));
        match tag {
            Tag::PayRequest => {
                let request: PayRequest = serde_json::from_value(value).map_err(malformed)?;
                request.validate()?;
                Ok(Self::Pay(request))
            }
            Tag::ChannelRequest => serde_json::from_value(value)
                .map(Self::Channel)
                .map_err(malformed),
            Tag::WithdrawRequest => serde_json::from_value(value)
                .map(Self::Withdraw)
                .map_err(malformed),
        }
    }

    pub fn tag(&self) -> Tag {
        match self {
            Self::Pay(_) => Tag::PayRequest,
            Self::Channel(_) => Tag::ChannelRequest,
            Self::Withdraw(_) => Tag::WithdrawRequest,
        }
    }
}

/// Fails with [`LnurlError::Callback`] when `value` is an LNURL error object.
pub fn reject_error_status(value: &Value) -> Result<(), LnurlError> {
    if value.get("status").and_then(Value::as_str) == Some("ERROR") {
        let reason = value
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("unspecified error");
        return Err(LnurlError::Callback(reason.to_string()));
    }
    Ok(())
}

/// Pay-request metadata.
///
/// The raw string is kept byte for byte since the invoice commits to its
/// hash, not to any re-serialization of the entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    raw: String,
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn parse(raw: &str) -> Result<Self, LnurlError> {
        let entries: Vec<(String, String)> = serde_json::from_str(raw)
            .map_err(|e| LnurlError::Protocol(format!("invalid metadata: {e}")))?;
        if !entries.iter().any(|(kind, _)| kind == "text/plain") {
            return Err(LnurlError::Protocol(
                "metadata has no text/plain entry".into(),
            ));
        }
        Ok(Self {
            raw: raw.to_string(),
            entries,
        })
    }

    /// Canonical `[["text/plain","<text>"]]`.
    pub fn plain_text(text: &str) -> Self {
        let entries = vec![("text/plain".to_string(), text.to_string())];
        // Serializing a Vec of string tuples cannot fail.
        let raw = serde_json::to_string(&entries).unwrap_or_default();
        Self { raw, entries }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn description(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|(kind, _)| kind == "text/plain")
            .map(|(_, value)| value.as_str())
    }

    pub fn commitment(&self) -> MetadataCommitment {
        MetadataCommitment::of(self.raw.as_bytes())
    }
}
