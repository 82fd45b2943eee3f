use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::error::LnurlError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP GET, the only verb LNURL needs.
#[async_trait]
pub trait LnurlTransport: Send + Sync {
    /// Network failures are [`LnurlError::Transport`]; any HTTP status is
    /// returned as a response.
    async fn get(&self, url: &Url) -> Result<HttpResponse, LnurlError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LnurlTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, LnurlError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LnurlError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| LnurlError::Transport(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}
