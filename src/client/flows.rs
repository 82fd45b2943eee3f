use serde::Serialize;
use serde_json::Value;

use crate::{
    error::LnurlError,
    lightning::{InvoiceDescription, InvoiceRequest},
    observer::Flow,
    protocol::{AmountBounds, CapabilityDocument, LightningAddress, PayRequest},
};

use super::{LnurlClient, PayOutcome, callback_url, parse_url};

#[derive(Debug, Clone, Serialize)]
pub struct ChannelOutcome {
    /// Node id the connection was made to
    pub peer: String,
    /// Server reply to the channel callback
    pub response: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawOutcome {
    pub invoice: String,
    pub payment_hash: String,
    pub amount_msat: u64,
}

fn unexpected(document: &CapabilityDocument, expected: &str) -> LnurlError {
    LnurlError::Protocol(format!("invalid tag {}, expected {expected}", document.tag()))
}

impl LnurlClient {
    pub async fn run_pay_flow(&self, url: &str, amount_msat: u64) -> Result<PayOutcome, LnurlError> {
        self.pay_flow().run(url, amount_msat).await
    }

    /// LNURL-channel: connect to the advertised peer, then ask it to open
    /// a channel towards us.
    pub async fn run_channel_flow(&self, url: &str) -> Result<ChannelOutcome, LnurlError> {
        self.observed(Flow::Channel, url, None, self.channel_flow(url))
            .await
    }

    async fn channel_flow(&self, url: &str) -> Result<ChannelOutcome, LnurlError> {
        let url = parse_url(url)?;
        let request = match self.fetch_document(&url).await? {
            CapabilityDocument::Channel(request) => request,
            other => return Err(unexpected(&other, "channelRequest")),
        };

        let connected = self.node().connect(&request.uri).await?;
        let own = self.node().get_info().await?;

        let config = self.config();
        let amount = config.channel_amount_sat.to_string();
        let private = if config.private_channel { "1" } else { "0" };
        let callback = callback_url(
            &url,
            &request.callback,
            &[
                ("k1", request.k1.as_str()),
                ("remote_id", own.id.as_str()),
                ("amount", amount.as_str()),
                ("private", private),
            ],
        )?;
        let response = self.get_json(&callback).await?;

        Ok(ChannelOutcome {
            peer: connected.id,
            response,
        })
    }

    /// LNURL-withdraw: invoice ourselves and hand the invoice to the
    /// service for payment.
    pub async fn run_withdraw_flow(
        &self,
        url: &str,
        amount_msat: u64,
    ) -> Result<WithdrawOutcome, LnurlError> {
        self.observed(
            Flow::Withdraw,
            url,
            Some(amount_msat),
            self.withdraw_flow(url, amount_msat),
        )
        .await
    }

    async fn withdraw_flow(&self, url: &str, amount_msat: u64) -> Result<WithdrawOutcome, LnurlError> {
        let url = parse_url(url)?;
        let request = match self.fetch_document(&url).await? {
            CapabilityDocument::Withdraw(request) => request,
            other => return Err(unexpected(&other, "withdrawRequest")),
        };

        let config = self.config();
        let bounds = AmountBounds::negotiate(
            request.min_withdrawable,
            request.max_withdrawable,
            config.local_min_sendable,
            config.local_max_sendable,
        )?;
        bounds.check(amount_msat)?;

        let invoice = self
            .node()
            .create_invoice(InvoiceRequest {
                amount_msat,
                label: format!("lnurlw_{}", hex::encode(rand::random::<[u8; 8]>())),
                description: InvoiceDescription::Direct(request.default_description.clone()),
            })
            .await
            .map_err(|e| LnurlError::InvoiceCreation(e.to_string()))?;

        let callback = callback_url(
            &url,
            &request.callback,
            &[("k1", request.k1.as_str()), ("pr", invoice.bolt11.as_str())],
        )?;
        self.get_json(&callback).await?;

        Ok(WithdrawOutcome {
            invoice: invoice.bolt11,
            payment_hash: invoice.payment_hash,
            amount_msat,
        })
    }

    /// Single GET against an auth URL; the body is returned as is.
    pub async fn run_auth_flow(&self, url: &str) -> Result<Value, LnurlError> {
        self.observed(Flow::Auth, url, None, self.auth_flow(url)).await
    }

    async fn auth_flow(&self, url: &str) -> Result<Value, LnurlError> {
        let url = parse_url(url)?;
        self.get_json(&url).await
    }

    /// Resolve a lightning address to its pay request, without paying.
    pub async fn run_static_flow(&self, identifier: &str) -> Result<PayRequest, LnurlError> {
        self.observed(Flow::Static, identifier, None, self.static_flow(identifier))
            .await
    }

    async fn static_flow(&self, identifier: &str) -> Result<PayRequest, LnurlError> {
        let url = self.well_known_url(identifier)?;
        match self.fetch_document(&url).await? {
            CapabilityDocument::Pay(request) => Ok(request),
            other => Err(unexpected(&other, "payRequest")),
        }
    }

    pub async fn pay_address(
        &self,
        identifier: &str,
        amount_msat: u64,
    ) -> Result<PayOutcome, LnurlError> {
        let url = self.well_known_url(identifier)?;
        self.pay_flow().run(url.as_str(), amount_msat).await
    }

    fn well_known_url(&self, identifier: &str) -> Result<url::Url, LnurlError> {
        let address: LightningAddress = identifier.parse()?;
        parse_url(&address.well_known_url(&self.config().well_known_scheme))
    }
}
