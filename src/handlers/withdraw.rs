use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::{info, warn};

use super::{reject, required};
use crate::{
    app_state::AppState,
    error::{ErrorResponse, LnurlError},
    protocol::{AmountBounds, Status, StatusResponse, Tag, WithdrawRequest},
};

#[derive(Debug, Deserialize)]
pub struct WithdrawCallbackParams {
    k1: Option<String>,
    pr: Option<String>, // Lightning invoice
}

/// GET /lnurl-withdraw
/// Advertise withdrawable bounds and issue a k1 for the callback
pub async fn withdraw_request(State(state): State<AppState>) -> Json<WithdrawRequest> {
    let k1 = state.challenges.issue(Tag::WithdrawRequest).await;
    let default_description = state
        .metadata
        .description()
        .map(|text| format!("Withdrawal: {text}"))
        .unwrap_or_else(|| "Withdrawal".to_string());

    Json(WithdrawRequest {
        status: Some(Status::Ok),
        tag: Tag::WithdrawRequest,
        callback: state.config.callback_url("lnurl-withdraw/callback"),
        k1,
        default_description,
        min_withdrawable: state.config.min_withdrawable,
        max_withdrawable: state.config.max_withdrawable,
    })
}

/// GET /lnurl-withdraw/callback?k1={k1}&pr={invoice}
/// Pay the caller's invoice once
pub async fn withdraw_callback(
    Query(params): Query<WithdrawCallbackParams>,
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ErrorResponse> {
    let k1 = required("k1", params.k1).map_err(reject)?;
    let pr = required("pr", params.pr).map_err(reject)?;

    state
        .challenges
        .redeem(&k1, Tag::WithdrawRequest)
        .await
        .map_err(reject)?;

    let invoice = state
        .node
        .decode_invoice(&pr)
        .await
        .map_err(|e| reject(LnurlError::Protocol(format!("invalid invoice: {e}"))))?;
    let amount_msat = invoice
        .amount_msat
        .ok_or_else(|| reject(LnurlError::Protocol("invoice must have an amount".into())))?;

    AmountBounds::negotiate(
        state.config.min_withdrawable,
        state.config.max_withdrawable,
        0,
        u64::MAX,
    )
    .and_then(|bounds| bounds.check(amount_msat))
    .map_err(reject)?;

    let payment = state
        .node
        .pay(&pr)
        .await
        .map_err(|e| reject(LnurlError::from_payment(e)))?;

    if !payment.is_complete() {
        warn!(status = %payment.status, payment_hash = %payment.payment_hash, "withdrawal not settled yet");
    }
    info!(amount_msat, payment_hash = %payment.payment_hash, "withdrawal paid");
    Ok(Json(StatusResponse::ok()))
}
