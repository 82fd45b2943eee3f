pub mod channel;
pub mod gift_card;
pub mod pay;
pub mod well_known;
pub mod withdraw;

use axum::{Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::{
    app_state::AppState,
    error::{ErrorResponse, LnurlError, lnurl_error},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        // LNURL-pay
        .route("/lnurl6", get(pay::pay_request))
        .route("/lnurl-pay", get(pay::pay_callback))
        // LNURL-channel
        .route("/lnurl2", get(channel::channel_request))
        .route("/lnurl-channel-request", get(channel::channel_callback))
        // LNURL-withdraw
        .route("/lnurl-withdraw", get(withdraw::withdraw_request))
        .route("/lnurl-withdraw/callback", get(withdraw::withdraw_callback))
        // Lightning address
        .route("/.well-known/lnurlp/{user}", get(well_known::well_known_pay))
        // Gift cards
        .route("/api/create_invoice/{amount}", get(gift_card::create_invoice))
        .route("/api/check_payment/{payment_hash}", get(gift_card::check_payment))
        .route("/api/test_node", get(gift_card::test_node))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Log and convert into an LNURL error body.
fn reject(err: impl Into<LnurlError>) -> ErrorResponse {
    let err = err.into();
    warn!(error = %err, "request rejected");
    lnurl_error(&err)
}

fn required(name: &str, value: Option<String>) -> Result<String, LnurlError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| LnurlError::Protocol(format!("missing {name}")))
}

/// Query amounts arrive as strings so malformed input still gets an LNURL
/// error body instead of an extractor rejection.
fn parse_amount(name: &str, value: Option<String>) -> Result<u64, LnurlError> {
    let raw = required(name, value)?;
    match raw.parse::<u64>() {
        Ok(amount) if amount > 0 => Ok(amount),
        _ => Err(LnurlError::Protocol(format!(
            "{name} must be a positive integer, got {raw:?}"
        ))),
    }
}

fn parse_flag(name: &str, value: Option<String>) -> Result<bool, LnurlError> {
    match value.as_deref() {
        None | Some("") | Some("0") | Some("false") => Ok(false),
        Some("1") | Some("true") => Ok(true),
        Some(other) => Err(LnurlError::Protocol(format!("invalid {name} flag {other:?}"))),
    }
}
