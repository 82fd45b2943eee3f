//! Wallet side of LNURL: fetches capability documents, negotiates amounts
//! and drives the local node.

pub mod flows;
pub mod pay;
pub mod routes;
pub mod transport;

use serde_json::Value;
use std::{future::Future, sync::Arc};
use url::Url;

use crate::{
    config::ClientConfig,
    error::LnurlError,
    lightning::NodeRpc,
    observer::{Flow, FlowEvent, FlowObserver, TracingObserver},
    protocol::{CapabilityDocument, reject_error_status},
};

pub use flows::{ChannelOutcome, WithdrawOutcome};
pub use pay::{PayFlow, PayFlowState, PayOutcome};
pub use transport::{HttpResponse, LnurlTransport, ReqwestTransport};

pub struct LnurlClient {
    config: ClientConfig,
    transport: Arc<dyn LnurlTransport>,
    node: Arc<dyn NodeRpc>,
    observer: Arc<dyn FlowObserver>,
}

impl LnurlClient {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn LnurlTransport>,
        node: Arc<dyn NodeRpc>,
    ) -> Self {
        Self {
            config,
            transport,
            node,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn FlowObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn node(&self) -> &Arc<dyn NodeRpc> {
        &self.node
    }

    pub(crate) fn emit(&self, event: FlowEvent<'_>) {
        self.observer.on_event(&event);
    }

    /// GET `url` and return its JSON body.
    ///
    /// Non-2xx responses and `{"status": "ERROR"}` bodies both become
    /// [`LnurlError::Callback`].
    pub async fn get_json(&self, url: &Url) -> Result<Value, LnurlError> {
        let response = self.transport.get(url).await?;
        let value: Option<Value> = serde_json::from_str(&response.body).ok();

        if !response.is_success() {
            let reason = value
                .as_ref()
                .and_then(|v| v.get("reason").or_else(|| v.get("error")))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            return Err(LnurlError::Callback(reason));
        }

        let value = value.ok_or_else(|| {
            LnurlError::Protocol(format!("response from {url} is not JSON"))
        })?;
        reject_error_status(&value)?;
        Ok(value)
    }

    pub async fn fetch_document(&self, url: &Url) -> Result<CapabilityDocument, LnurlError> {
        let value = self.get_json(url).await?;
        CapabilityDocument::from_value(value)
    }

    pub fn pay_flow(&self) -> PayFlow<'_> {
        PayFlow::new(self)
    }

    /// Run `work` bracketed by started/completed/aborted events.
    pub(crate) async fn observed<T, F>(
        &self,
        flow: Flow,
        target: &str,
        amount_msat: Option<u64>,
        work: F,
    ) -> Result<T, LnurlError>
    where
        F: Future<Output = Result<T, LnurlError>>,
    {
        self.emit(FlowEvent::Started {
            flow,
            target,
            amount_msat,
        });
        match work.await {
            Ok(value) => {
                self.emit(FlowEvent::Completed { flow });
                Ok(value)
            }
            Err(error) => {
                self.emit(FlowEvent::Aborted {
                    flow,
                    error: &error,
                });
                Err(error)
            }
        }
    }
}

pub(crate) fn parse_url(raw: &str) -> Result<Url, LnurlError> {
    Url::parse(raw).map_err(|e| LnurlError::Protocol(format!("invalid url {raw:?}: {e}")))
}

/// Resolve `callback` against the document's URL and append `query`.
///
/// Existing query parameters on the callback are kept.
pub(crate) fn callback_url(
    base: &Url,
    callback: &str,
    query: &[(&str, &str)],
) -> Result<Url, LnurlError> {
    let mut url = base
        .join(callback)
        .map_err(|e| LnurlError::Protocol(format!("invalid callback {callback:?}: {e}")))?;
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}
