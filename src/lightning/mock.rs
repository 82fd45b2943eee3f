//! In-memory node for tests and local development.
//!
//! Invoices are self-describing (`lnmock1` followed by hex-encoded JSON), so
//! a `MockNode` can decode invoices created by any other `MockNode`, the way
//! two real nodes can decode each other's bolt11 strings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::{
    ChannelResult, ChannelSummary, ConnectResult, CreatedInvoice, DecodedInvoice, InvoiceDescription,
    InvoiceRequest, InvoiceStatus, NodeAddress, NodeInfo, NodeRpc, NodeRpcError, PaymentResult,
};

const PREFIX: &str = "lnmock1";

#[derive(Debug, Serialize, Deserialize)]
struct MockInvoice {
    /// `None` for "any amount" invoices
    amount_msat: Option<u64>,
    description: Option<String>,
    description_hash: Option<String>,
    payment_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundChannelCall {
    pub node_id: String,
    pub amount_sat: u64,
    pub announce: bool,
}

#[derive(Default)]
struct MockState {
    invoices: HashMap<String, InvoiceStatus>,
    channels: Vec<ChannelSummary>,
    payments: Vec<String>,
    connections: Vec<String>,
    fundings: Vec<FundChannelCall>,
    fail_invoices: Option<String>,
    pay_times_out: bool,
}

pub struct MockNode {
    info: NodeInfo,
    state: Mutex<MockState>,
}

impl MockNode {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            info: NodeInfo {
                id: node_id.into(),
                addresses: vec![NodeAddress {
                    kind: "ipv4".to_string(),
                    address: "127.0.0.1".to_string(),
                    port: 9735,
                }],
            },
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn without_addresses(mut self) -> Self {
        self.info.addresses.clear();
        self
    }

    pub fn node_id(&self) -> &str {
        &self.info.id
    }

    /// Make invoice creation fail with `reason` until cleared.
    pub async fn fail_invoices(&self, reason: Option<&str>) {
        self.state.lock().await.fail_invoices = reason.map(str::to_string);
    }

    pub async fn set_pay_times_out(&self, times_out: bool) {
        self.state.lock().await.pay_times_out = times_out;
    }

    pub async fn add_channel(&self, destination: &str, active: bool) {
        let mut state = self.state.lock().await;
        let short_channel_id = format!("{}x1x0", state.channels.len() + 100);
        state.channels.push(ChannelSummary {
            source: self.info.id.clone(),
            destination: destination.to_string(),
            short_channel_id,
            active,
        });
    }

    /// Settle an invoice this node issued.
    pub async fn mark_paid(&self, payment_hash: &str) -> bool {
        let mut state = self.state.lock().await;
        match state
            .invoices
            .values_mut()
            .find(|invoice| invoice.payment_hash == payment_hash)
        {
            Some(invoice) => {
                invoice.status = "paid".to_string();
                true
            }
            None => false,
        }
    }

    pub async fn payments(&self) -> Vec<String> {
        self.state.lock().await.payments.clone()
    }

    pub async fn connections(&self) -> Vec<String> {
        self.state.lock().await.connections.clone()
    }

    pub async fn fundings(&self) -> Vec<FundChannelCall> {
        self.state.lock().await.fundings.clone()
    }

    /// An invoice without an amount, as issued by some other node.
    pub fn amountless_invoice(description: &str) -> Result<String, NodeRpcError> {
        Self::encode(&MockInvoice {
            amount_msat: None,
            description: Some(description.to_string()),
            description_hash: None,
            payment_hash: hex::encode(Sha256::digest(rand::random::<[u8; 32]>())),
        })
    }

    fn encode(invoice: &MockInvoice) -> Result<String, NodeRpcError> {
        let json = serde_json::to_vec(invoice).map_err(|e| NodeRpcError::Malformed(e.to_string()))?;
        Ok(format!("{PREFIX}{}", hex::encode(json)))
    }

    fn decode(bolt11: &str) -> Result<MockInvoice, NodeRpcError> {
        let invalid = || NodeRpcError::Rpc {
            method: "decodepay".to_string(),
            code: -32602,
            message: "Invalid bolt11".to_string(),
        };
        let payload = bolt11.strip_prefix(PREFIX).ok_or_else(invalid)?;
        let json = hex::decode(payload).map_err(|_| invalid())?;
        serde_json::from_slice(&json).map_err(|_| invalid())
    }
}

#[async_trait]
impl NodeRpc for MockNode {
    async fn get_info(&self) -> Result<NodeInfo, NodeRpcError> {
        Ok(self.info.clone())
    }

    async fn create_invoice(&self, request: InvoiceRequest) -> Result<CreatedInvoice, NodeRpcError> {
        let mut state = self.state.lock().await;
        if let Some(reason) = &state.fail_invoices {
            return Err(NodeRpcError::Rpc {
                method: "invoice".to_string(),
                code: 902,
                message: reason.clone(),
            });
        }
        if state.invoices.contains_key(&request.label) {
            return Err(NodeRpcError::Rpc {
                method: "invoice".to_string(),
                code: 900,
                message: "Duplicate label".to_string(),
            });
        }

        let preimage: [u8; 32] = rand::random();
        let payment_hash = hex::encode(Sha256::digest(preimage));
        let (description, description_hash) = match request.description {
            InvoiceDescription::Direct(text) => (Some(text), None),
            InvoiceDescription::HashOf(text) => (None, Some(hex::encode(Sha256::digest(text.as_bytes())))),
        };
        let bolt11 = Self::encode(&MockInvoice {
            amount_msat: Some(request.amount_msat),
            description,
            description_hash,
            payment_hash: payment_hash.clone(),
        })?;

        state.invoices.insert(
            request.label.clone(),
            InvoiceStatus {
                label: request.label,
                payment_hash: payment_hash.clone(),
                status: "unpaid".to_string(),
                amount_msat: Some(request.amount_msat),
            },
        );

        Ok(CreatedInvoice {
            bolt11,
            payment_hash,
            expires_at: 0,
        })
    }

    async fn decode_invoice(&self, bolt11: &str) -> Result<DecodedInvoice, NodeRpcError> {
        let invoice = Self::decode(bolt11)?;
        Ok(DecodedInvoice {
            amount_msat: invoice.amount_msat,
            description: invoice.description,
            description_hash: invoice.description_hash,
            payment_hash: invoice.payment_hash,
        })
    }

    async fn pay(&self, bolt11: &str) -> Result<PaymentResult, NodeRpcError> {
        let invoice = Self::decode(bolt11)?;
        let mut state = self.state.lock().await;
        state.payments.push(bolt11.to_string());
        if state.pay_times_out {
            return Err(NodeRpcError::Timeout {
                method: "pay".to_string(),
            });
        }
        Ok(PaymentResult {
            status: "complete".to_string(),
            payment_hash: invoice.payment_hash,
            payment_preimage: Some("00".repeat(32)),
            amount_sent_msat: invoice.amount_msat,
        })
    }

    async fn connect(&self, peer_uri: &str) -> Result<ConnectResult, NodeRpcError> {
        let (id, _) = peer_uri.split_once('@').unwrap_or((peer_uri, ""));
        self.state.lock().await.connections.push(peer_uri.to_string());
        Ok(ConnectResult { id: id.to_string() })
    }

    async fn fund_channel(
        &self,
        node_id: &str,
        amount_sat: u64,
        announce: bool,
    ) -> Result<ChannelResult, NodeRpcError> {
        let mut state = self.state.lock().await;
        state.fundings.push(FundChannelCall {
            node_id: node_id.to_string(),
            amount_sat,
            announce,
        });
        Ok(ChannelResult {
            txid: hex::encode(rand::random::<[u8; 32]>()),
            channel_id: hex::encode(rand::random::<[u8; 32]>()),
            outnum: Some(0),
        })
    }

    async fn list_invoices(
        &self,
        payment_hash: Option<&str>,
    ) -> Result<Vec<InvoiceStatus>, NodeRpcError> {
        let state = self.state.lock().await;
        Ok(state
            .invoices
            .values()
            .filter(|invoice| payment_hash.is_none_or(|hash| invoice.payment_hash == hash))
            .cloned()
            .collect())
    }

    async fn list_channels(&self, source: Option<&str>) -> Result<Vec<ChannelSummary>, NodeRpcError> {
        let state = self.state.lock().await;
        Ok(state
            .channels
            .iter()
            .filter(|channel| source.is_none_or(|source| channel.source == source))
            .cloned()
            .collect())
    }
}
