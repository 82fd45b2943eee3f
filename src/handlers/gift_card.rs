use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    app_state::AppState,
    db::models::NewGiftCard,
    lightning::{InvoiceDescription, InvoiceRequest},
};

/// Face value in EUR → price in satoshis
pub const GIFT_CARD_PRICES: &[(&str, u64)] = &[("25", 25_000), ("50", 50_000), ("100", 100_000)];

pub fn price_sat(amount: &str) -> Option<u64> {
    GIFT_CARD_PRICES
        .iter()
        .find(|(face_value, _)| *face_value == amount)
        .map(|(_, sats)| *sats)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: message.into(),
        }),
    )
}

fn internal(context: &str, e: impl std::fmt::Display) -> (StatusCode, Json<ApiError>) {
    error!(error = %e, "{context}");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{context}: {e}"))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateInvoiceResponse {
    pub payment_request: String,
    pub payment_hash: String,
}

/// GET /api/create_invoice/{amount}
/// Invoice a gift card and record the pending order
pub async fn create_invoice(
    Path(amount): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<CreateInvoiceResponse> {
    let sats = price_sat(&amount).ok_or_else(|| {
        warn!(%amount, "invalid gift card amount");
        api_error(StatusCode::BAD_REQUEST, "invalid amount")
    })?;
    let face_value: i64 = amount
        .parse()
        .map_err(|e| internal("invalid price table entry", e))?;

    let info = state
        .node
        .get_info()
        .await
        .map_err(|e| internal("node unavailable", e))?;
    if let Some(expected) = &state.config.merchant_node_id {
        if &info.id != expected {
            error!(expected = %expected, actual = %info.id, "connected to the wrong node");
            return Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "node misconfigured",
            ));
        }
    }

    let channels = state
        .node
        .list_channels(Some(&info.id))
        .await
        .map_err(|e| internal("failed to list channels", e))?;
    if !channels.iter().any(|c| c.active) {
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "no active channel available",
        ));
    }

    let label = format!("giftcard_{}", hex::encode(rand::random::<[u8; 8]>()));
    let invoice = state
        .node
        .create_invoice(InvoiceRequest {
            amount_msat: sats * 1000,
            label: label.clone(),
            description: InvoiceDescription::Direct(format!("Gift card {amount} EUR")),
        })
        .await
        .map_err(|e| internal("failed to create invoice", e))?;

    state
        .gift_cards
        .create(&NewGiftCard {
            id: label.clone(),
            amount: face_value,
            payment_hash: invoice.payment_hash.clone(),
        })
        .await
        .map_err(|e| internal("failed to store order", e))?;

    info!(%label, sats, payment_hash = %invoice.payment_hash, "gift card invoice created");
    Ok(Json(CreateInvoiceResponse {
        payment_request: invoice.bolt11,
        payment_hash: invoice.payment_hash,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckPaymentResponse {
    pub paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gift_code: Option<String>,
}

/// GET /api/check_payment/{payment_hash}
/// Complete the order once its invoice is paid; repeated polls return the same code
pub async fn check_payment(
    Path(payment_hash): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<CheckPaymentResponse> {
    let invoices = state
        .node
        .list_invoices(Some(&payment_hash))
        .await
        .map_err(|e| internal("failed to list invoices", e))?;

    let paid = invoices
        .iter()
        .any(|invoice| invoice.payment_hash == payment_hash && invoice.is_paid());
    if !paid {
        return Ok(Json(CheckPaymentResponse {
            paid: false,
            gift_code: None,
        }));
    }

    let code = format!("GIFT-{}", hex::encode(rand::random::<[u8; 8]>()));
    let card = state
        .gift_cards
        .complete(&payment_hash, &code)
        .await
        .map_err(|e| internal("failed to complete order", e))?;

    Ok(Json(CheckPaymentResponse {
        paid: true,
        gift_code: card.and_then(|card| card.code),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestNodeResponse {
    pub node_id: String,
    pub is_merchant_node: bool,
    pub active_channels: usize,
    pub total_channels: usize,
}

/// GET /api/test_node
pub async fn test_node(State(state): State<AppState>) -> ApiResult<TestNodeResponse> {
    let info = state
        .node
        .get_info()
        .await
        .map_err(|e| internal("node unavailable", e))?;
    let channels = state
        .node
        .list_channels(None)
        .await
        .map_err(|e| internal("failed to list channels", e))?;

    let active_channels = channels
        .iter()
        .filter(|c| c.active && c.source == info.id)
        .count();

    Ok(Json(TestNodeResponse {
        is_merchant_node: state.config.merchant_node_id.as_deref() == Some(info.id.as_str()),
        node_id: info.id,
        active_channels,
        total_channels: channels.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_table() {
        assert_eq!(price_sat("25"), Some(25_000));
        assert_eq!(price_sat("100"), Some(100_000));
        assert_eq!(price_sat("30"), None);
    }
}
