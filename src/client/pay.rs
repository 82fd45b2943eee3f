use serde::Serialize;

use crate::{
    error::LnurlError,
    lightning::PaymentResult,
    observer::{Flow, FlowEvent},
    protocol::{AmountBounds, CapabilityDocument, PayCallbackResponse, verify_invoice},
};

use super::{LnurlClient, callback_url, parse_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PayFlowState {
    Start,
    CapabilityFetched,
    BoundsOk,
    InvoiceRequested,
    InvoiceReceived,
    Verified,
    Paid,
    Aborted,
}

impl PayFlowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Aborted)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PayOutcome {
    pub invoice: String,
    pub amount_msat: u64,
    pub description: Option<String>,
    /// As reported by the node. `Paid` only means the node accepted the
    /// invoice, check `payment.status` for settlement.
    pub payment: PaymentResult,
}

/// LNURL-pay for a single payment.
///
/// Nothing is paid unless the invoice commits to the exact metadata that
/// was fetched and to the requested amount. A flow runs once; reuse is an
/// error.
pub struct PayFlow<'a> {
    client: &'a LnurlClient,
    state: PayFlowState,
}

impl<'a> PayFlow<'a> {
    pub(crate) fn new(client: &'a LnurlClient) -> Self {
        Self {
            client,
            state: PayFlowState::Start,
        }
    }

    pub fn state(&self) -> PayFlowState {
        self.state
    }

    pub async fn run(&mut self, url: &str, amount_msat: u64) -> Result<PayOutcome, LnurlError> {
        if self.state != PayFlowState::Start {
            return Err(LnurlError::Protocol(format!(
                "pay flow already ran, state {:?}",
                self.state
            )));
        }

        let client = self.client;
        client.emit(FlowEvent::Started {
            flow: Flow::Pay,
            target: url,
            amount_msat: Some(amount_msat),
        });
        match self.drive(url, amount_msat).await {
            Ok(outcome) => {
                client.emit(FlowEvent::Completed { flow: Flow::Pay });
                Ok(outcome)
            }
            Err(error) => {
                self.transition(PayFlowState::Aborted);
                client.emit(FlowEvent::Aborted {
                    flow: Flow::Pay,
                    error: &error,
                });
                Err(error)
            }
        }
    }

    fn transition(&mut self, to: PayFlowState) {
        let from = self.state;
        self.state = to;
        self.client.emit(FlowEvent::PayState { from, to });
    }

    async fn drive(&mut self, url: &str, amount_msat: u64) -> Result<PayOutcome, LnurlError> {
        let client = self.client;
        let url = parse_url(url)?;

        let request = match client.fetch_document(&url).await? {
            CapabilityDocument::Pay(request) => request,
            other => {
                return Err(LnurlError::Protocol(format!(
                    "invalid tag {}, expected payRequest",
                    other.tag()
                )));
            }
        };
        let metadata = request.validate()?;
        self.transition(PayFlowState::CapabilityFetched);

        let config = client.config();
        let bounds = AmountBounds::negotiate(
            request.min_sendable,
            request.max_sendable,
            config.local_min_sendable,
            config.local_max_sendable,
        )?;
        bounds.check(amount_msat)?;
        self.transition(PayFlowState::BoundsOk);

        let amount = amount_msat.to_string();
        let callback = callback_url(&url, &request.callback, &[("amount", amount.as_str())])?;
        self.transition(PayFlowState::InvoiceRequested);
        let body = client.get_json(&callback).await?;
        let response: PayCallbackResponse = serde_json::from_value(body)
            .map_err(|e| LnurlError::Protocol(format!("malformed pay callback response: {e}")))?;
        self.transition(PayFlowState::InvoiceReceived);

        let decoded = client.node().decode_invoice(&response.pr).await?;
        let verdict = verify_invoice(&decoded, &request.metadata, amount_msat);
        client.emit(FlowEvent::Verification {
            result: verdict.as_ref().map(|_| ()),
        });
        verdict?;
        self.transition(PayFlowState::Verified);

        let payment = client.node().pay(&response.pr).await.map_err(LnurlError::from_payment)?;
        client.emit(FlowEvent::Payment { result: &payment });
        self.transition(PayFlowState::Paid);

        Ok(PayOutcome {
            invoice: response.pr,
            amount_msat,
            description: metadata.description().map(str::to_string),
            payment,
        })
    }
}
