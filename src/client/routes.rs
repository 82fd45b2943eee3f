//! HTTP front end of the wallet: proxies gift-card orders to the server
//! and pays invoices from the local node.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    error::LnurlError,
    handlers::gift_card::{ApiError, CreateInvoiceResponse},
    lightning::PaymentResult,
};

use super::{LnurlClient, parse_url};

#[derive(Clone)]
pub struct ClientState {
    pub client: Arc<LnurlClient>,
}

pub fn router(state: ClientState) -> Router {
    Router::new()
        .route("/generate_invoice/{amount}", get(generate_invoice))
        .route("/check_payment/{payment_hash}", get(check_payment))
        .route("/pay_invoice/{bolt11}", get(pay_invoice))
        .route("/api/test_payment", get(test_payment))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn failed(context: &str, e: &LnurlError) -> (StatusCode, Json<ApiError>) {
    error!(error = %e, "{context}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError {
            error: format!("{context}: {e}"),
        }),
    )
}

/// GET a server endpoint. Each segment is percent-encoded, so caller input
/// cannot add path segments or a query.
async fn server_get(client: &LnurlClient, segments: &[&str]) -> Result<Value, LnurlError> {
    let mut url = parse_url(&client.config().server_url)?;
    let url_display = url.to_string();
    url.path_segments_mut()
        .map_err(|_| LnurlError::Protocol(format!("server url {url_display} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    client.get_json(&url).await
}

/// GET /generate_invoice/{amount}
async fn generate_invoice(
    Path(amount): Path<String>,
    State(state): State<ClientState>,
) -> ApiResult<CreateInvoiceResponse> {
    let value = server_get(&state.client, &["api", "create_invoice", amount.as_str()])
        .await
        .map_err(|e| failed("failed to generate invoice", &e))?;
    let invoice = serde_json::from_value(value).map_err(|e| {
        failed(
            "failed to generate invoice",
            &LnurlError::Protocol(e.to_string()),
        )
    })?;
    Ok(Json(invoice))
}

/// GET /check_payment/{payment_hash}
async fn check_payment(
    Path(payment_hash): Path<String>,
    State(state): State<ClientState>,
) -> ApiResult<Value> {
    let value = server_get(&state.client, &["api", "check_payment", payment_hash.as_str()])
        .await
        .map_err(|e| failed("failed to check payment", &e))?;
    Ok(Json(value))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PayInvoiceResponse {
    pub status: String,
    pub payment: PaymentResult,
}

/// Refuse to pay from a node other than the configured one.
async fn ensure_client_node(client: &LnurlClient) -> Result<String, LnurlError> {
    let info = client.node().get_info().await?;
    if let Some(expected) = &client.config().client_node_id {
        if &info.id != expected {
            return Err(LnurlError::Protocol(format!(
                "connected to node {} instead of {expected}",
                info.id
            )));
        }
    }
    Ok(info.id)
}

/// GET /pay_invoice/{bolt11}
async fn pay_invoice(
    Path(bolt11): Path<String>,
    State(state): State<ClientState>,
) -> ApiResult<PayInvoiceResponse> {
    ensure_client_node(&state.client)
        .await
        .map_err(|e| failed("client node misconfigured", &e))?;
    let payment = state
        .client
        .node()
        .pay(&bolt11)
        .await
        .map_err(|e| failed("payment failed", &LnurlError::from_payment(e)))?;

    info!(payment_hash = %payment.payment_hash, status = %payment.status, "invoice paid");
    Ok(Json(PayInvoiceResponse {
        status: "success".into(),
        payment,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestPaymentResponse {
    pub client_node_id: String,
    pub payment_hash: String,
    pub payment_status: String,
    pub payment_preimage: Option<String>,
}

/// GET /api/test_payment
/// Order the smallest gift card from the server and pay it.
async fn test_payment(State(state): State<ClientState>) -> ApiResult<TestPaymentResponse> {
    let client = &state.client;
    let node_id = ensure_client_node(client)
        .await
        .map_err(|e| failed("client node misconfigured", &e))?;

    let value = server_get(client, &["api", "create_invoice", "25"])
        .await
        .map_err(|e| failed("failed to generate invoice", &e))?;
    let invoice: CreateInvoiceResponse = serde_json::from_value(value).map_err(|e| {
        failed(
            "failed to generate invoice",
            &LnurlError::Protocol(e.to_string()),
        )
    })?;

    let payment = client
        .node()
        .pay(&invoice.payment_request)
        .await
        .map_err(|e| failed("payment failed", &LnurlError::from_payment(e)))?;

    Ok(Json(TestPaymentResponse {
        client_node_id: node_id,
        payment_hash: payment.payment_hash,
        payment_status: payment.status,
        payment_preimage: payment.payment_preimage,
    }))
}
