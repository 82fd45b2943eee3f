pub mod cln;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use thiserror::Error;

pub use cln::ClnRpc;
pub use mock::MockNode;

#[derive(Debug, Error)]
pub enum NodeRpcError {
    #[error("{method} failed ({code}): {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },
    #[error("rpc socket error: {0}")]
    Connect(String),
    #[error("{method} timed out")]
    Timeout { method: String },
    #[error("malformed rpc response: {0}")]
    Malformed(String),
}

impl NodeRpcError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAddress {
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: String,
    #[serde(default, rename = "address")]
    pub addresses: Vec<NodeAddress>,
}

impl NodeInfo {
    /// `nodeId@host:port` using the first advertised address.
    pub fn connect_uri(&self) -> Option<String> {
        self.addresses
            .first()
            .map(|addr| format!("{}@{}:{}", self.id, addr.address, addr.port))
    }
}

/// What an invoice's description field carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceDescription {
    Direct(String),
    /// Commit to `sha256(text)` instead of embedding `text`.
    HashOf(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRequest {
    pub amount_msat: u64,
    pub label: String,
    pub description: InvoiceDescription,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedInvoice {
    pub bolt11: String,
    pub payment_hash: String,
    #[serde(default)]
    pub expires_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedInvoice {
    #[serde(default, deserialize_with = "deserialize_msat")]
    pub amount_msat: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_hash: Option<String>,
    pub payment_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub status: String,
    pub payment_hash: String,
    #[serde(default)]
    pub payment_preimage: Option<String>,
    #[serde(default, deserialize_with = "deserialize_msat")]
    pub amount_sent_msat: Option<u64>,
}

impl PaymentResult {
    pub fn is_complete(&self) -> bool {
        self.status == "complete"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectResult {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelResult {
    pub txid: String,
    pub channel_id: String,
    #[serde(default)]
    pub outnum: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceStatus {
    pub label: String,
    pub payment_hash: String,
    pub status: String,
    #[serde(default, deserialize_with = "deserialize_msat")]
    pub amount_msat: Option<u64>,
}

impl InvoiceStatus {
    pub fn is_paid(&self) -> bool {
        self.status == "paid"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub source: String,
    pub destination: String,
    pub short_channel_id: String,
    pub active: bool,
}

/// The node operations the LNURL flows rely on.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    async fn get_info(&self) -> Result<NodeInfo, NodeRpcError>;

    async fn create_invoice(&self, request: InvoiceRequest) -> Result<CreatedInvoice, NodeRpcError>;

    async fn decode_invoice(&self, bolt11: &str) -> Result<DecodedInvoice, NodeRpcError>;

    /// A timeout here does not mean the payment failed.
    async fn pay(&self, bolt11: &str) -> Result<PaymentResult, NodeRpcError>;

    /// Connect to a peer given as `nodeId@host:port`.
    async fn connect(&self, peer_uri: &str) -> Result<ConnectResult, NodeRpcError>;

    async fn fund_channel(
        &self,
        node_id: &str,
        amount_sat: u64,
        announce: bool,
    ) -> Result<ChannelResult, NodeRpcError>;

    async fn list_invoices(
        &self,
        payment_hash: Option<&str>,
    ) -> Result<Vec<InvoiceStatus>, NodeRpcError>;

    async fn list_channels(&self, source: Option<&str>) -> Result<Vec<ChannelSummary>, NodeRpcError>;
}

/// Millisatoshi amounts come either as integers or, from older nodes, as
/// `"1000msat"` strings.
fn deserialize_msat<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| de::Error::custom("msat amount must be a non-negative integer")),
        Some(Value::String(s)) => s
            .trim_end_matches("msat")
            .parse()
            .map(Some)
            .map_err(de::Error::custom),
        Some(other) => Err(de::Error::custom(format!("unexpected msat amount {other}"))),
    }
}
