use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};

use super::{parse_amount, reject};
use crate::{
    app_state::AppState,
    error::{ErrorResponse, LnurlError},
    lightning::{CreatedInvoice, InvoiceDescription, InvoiceRequest},
    protocol::{AmountBounds, PayCallbackResponse, PayRequest, Tag},
};

#[derive(Debug, Deserialize)]
pub struct PayCallbackParams {
    amount: Option<String>, // millisatoshis
}

pub fn pay_document(state: &AppState) -> PayRequest {
    PayRequest {
        callback: state.config.callback_url("lnurl-pay"),
        max_sendable: state.config.max_sendable,
        min_sendable: state.config.min_sendable,
        metadata: state.metadata.as_str().to_string(),
        tag: Tag::PayRequest,
    }
}

/// GET /lnurl6
/// Static pay request, no side effects
pub async fn pay_request(State(state): State<AppState>) -> Json<PayRequest> {
    Json(pay_document(&state))
}

/// GET /lnurl-pay?amount={msat}
/// Issue an invoice committing to the advertised metadata
pub async fn pay_callback(
    Query(params): Query<PayCallbackParams>,
    State(state): State<AppState>,
) -> Result<Json<PayCallbackResponse>, ErrorResponse> {
    let amount_msat = parse_amount("amount", params.amount).map_err(reject)?;

    AmountBounds::negotiate(state.config.min_sendable, state.config.max_sendable, 0, u64::MAX)
        .and_then(|bounds| bounds.check(amount_msat))
        .map_err(reject)?;

    let invoice = generate_invoice(&state, amount_msat).await.map_err(reject)?;

    Ok(Json(PayCallbackResponse {
        pr: invoice.bolt11,
        routes: Vec::new(),
    }))
}

async fn generate_invoice(state: &AppState, amount_msat: u64) -> Result<CreatedInvoice, LnurlError> {
    let label = format!(
        "invoice_{}_{}",
        Utc::now().format("%Y%m%d%H%M%S"),
        hex::encode(rand::random::<[u8; 4]>())
    );

    let invoice = state
        .node
        .create_invoice(InvoiceRequest {
            amount_msat,
            label: label.clone(),
            description: InvoiceDescription::HashOf(state.metadata.as_str().to_string()),
        })
        .await
        .map_err(|e| {
            error!(%label, error = %e, "invoice creation failed");
            LnurlError::InvoiceCreation(e.to_string())
        })?;

    info!(%label, amount_msat, payment_hash = %invoice.payment_hash, "generated invoice");
    Ok(invoice)
}
