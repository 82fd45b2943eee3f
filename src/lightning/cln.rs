//! Core Lightning JSON-RPC over the node's unix socket, via `cln-rpc`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use std::fmt::Debug;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, trace};

use super::{
    ChannelResult, ChannelSummary, ConnectResult, CreatedInvoice, DecodedInvoice, InvoiceDescription,
    InvoiceRequest, InvoiceStatus, NodeInfo, NodeRpc, NodeRpcError, PaymentResult,
};

#[derive(Debug, Deserialize)]
struct ListInvoices {
    invoices: Vec<InvoiceStatus>,
}

#[derive(Debug, Deserialize)]
struct ListChannels {
    channels: Vec<ChannelSummary>,
}

#[derive(Debug, Serialize)]
struct InvoiceParams<'a> {
    amount_msat: u64,
    label: &'a str,
    description: &'a str,
    deschashonly: bool,
}

/// One socket connection per call. `pay` gets its own, usually longer,
/// bound since lightningd only answers once the payment resolves.
pub struct ClnRpc {
    socket_path: PathBuf,
    timeout: Duration,
    pay_timeout: Duration,
}

impl ClnRpc {
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
            pay_timeout: timeout,
        }
    }

    pub fn with_pay_timeout(mut self, pay_timeout: Duration) -> Self {
        self.pay_timeout = pay_timeout;
        self
    }

    async fn call<P, R>(&self, method: &str, params: P) -> Result<R, NodeRpcError>
    where
        P: Serialize + Debug,
        R: DeserializeOwned + Debug,
    {
        self.call_within(self.timeout, method, params).await
    }

    async fn call_within<P, R>(&self, limit: Duration, method: &str, params: P) -> Result<R, NodeRpcError>
    where
        P: Serialize + Debug,
        R: DeserializeOwned + Debug,
    {
        tokio::time::timeout(limit, self.call_unbounded(method, params))
            .await
            .map_err(|_| NodeRpcError::Timeout {
                method: method.to_string(),
            })?
    }

    async fn call_unbounded<P, R>(&self, method: &str, params: P) -> Result<R, NodeRpcError>
    where
        P: Serialize + Debug,
        R: DeserializeOwned + Debug,
    {
        debug!(method, "calling node rpc");
        let mut rpc = cln_rpc::ClnRpc::new(&self.socket_path)
            .await
            .map_err(|e| NodeRpcError::Connect(e.to_string()))?;

        let result = rpc.call_raw::<R, P>(method, &params).await;
        trace!(method, ok = result.is_ok(), "node rpc response");
        result.map_err(|error| match error.code {
            Some(code) => NodeRpcError::Rpc {
                method: method.to_string(),
                code: code.into(),
                message: error.message,
            },
            // No code means the reply itself could not be read.
            None => NodeRpcError::Malformed(format!("{method}: {}", error.message)),
        })
    }
}

#[async_trait]
impl NodeRpc for ClnRpc {
    async fn get_info(&self) -> Result<NodeInfo, NodeRpcError> {
        self.call("getinfo", json!({})).await
    }

    async fn create_invoice(&self, request: InvoiceRequest) -> Result<CreatedInvoice, NodeRpcError> {
        let (description, deschashonly) = match &request.description {
            InvoiceDescription::Direct(text) => (text.as_str(), false),
            InvoiceDescription::HashOf(text) => (text.as_str(), true),
        };
        self.call(
            "invoice",
            InvoiceParams {
                amount_msat: request.amount_msat,
                label: &request.label,
                description,
                deschashonly,
            },
        )
        .await
    }

    async fn decode_invoice(&self, bolt11: &str) -> Result<DecodedInvoice, NodeRpcError> {
        self.call("decodepay", json!({ "bolt11": bolt11 })).await
    }

    async fn pay(&self, bolt11: &str) -> Result<PaymentResult, NodeRpcError> {
        self.call_within(self.pay_timeout, "pay", json!({ "bolt11": bolt11 }))
            .await
    }

    async fn connect(&self, peer_uri: &str) -> Result<ConnectResult, NodeRpcError> {
        self.call("connect", json!({ "id": peer_uri })).await
    }

    async fn fund_channel(
        &self,
        node_id: &str,
        amount_sat: u64,
        announce: bool,
    ) -> Result<ChannelResult, NodeRpcError> {
        self.call(
            "fundchannel",
            json!({ "id": node_id, "amount": amount_sat, "announce": announce }),
        )
        .await
    }

    async fn list_invoices(
        &self,
        payment_hash: Option<&str>,
    ) -> Result<Vec<InvoiceStatus>, NodeRpcError> {
        let params = match payment_hash {
            Some(hash) => json!({ "payment_hash": hash }),
            None => json!({}),
        };
        let listed: ListInvoices = self.call("listinvoices", params).await?;
        Ok(listed.invoices)
    }

    async fn list_channels(&self, source: Option<&str>) -> Result<Vec<ChannelSummary>, NodeRpcError> {
        let params = match source {
            Some(source) => json!({ "source": source }),
            None => json!({}),
        };
        let listed: ListChannels = self.call("listchannels", params).await?;
        Ok(listed.channels)
    }
}
