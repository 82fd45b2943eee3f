use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{parse_amount, parse_flag, reject, required};
use crate::{
    app_state::AppState,
    error::{ErrorResponse, LnurlError, error_response},
    lightning::ChannelResult,
    protocol::{ChannelRequest, Status, Tag},
};

#[derive(Debug, Deserialize)]
pub struct ChannelCallbackParams {
    k1: Option<String>,
    remote_id: Option<String>,
    amount: Option<String>, // satoshis
    private: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelCallbackResponse {
    pub status: Status,
    pub result: ChannelResult,
}

/// GET /lnurl2
/// Advertise our node and issue a k1 for the channel callback
pub async fn channel_request(
    State(state): State<AppState>,
) -> Result<Json<ChannelRequest>, ErrorResponse> {
    let info = state.node.get_info().await.map_err(reject)?;
    let uri = info.connect_uri().ok_or_else(|| {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "node advertises no address",
        )
    })?;

    let k1 = state.challenges.issue(Tag::ChannelRequest).await;

    Ok(Json(ChannelRequest {
        status: Some(Status::Ok),
        tag: Tag::ChannelRequest,
        uri,
        k1,
        callback: state.config.callback_url("lnurl-channel-request"),
    }))
}

/// GET /lnurl-channel-request?k1={k1}&remote_id={node_id}&amount={sat}&private={0|1}
/// Open a channel to the caller once its k1 checks out
pub async fn channel_callback(
    Query(params): Query<ChannelCallbackParams>,
    State(state): State<AppState>,
) -> Result<Json<ChannelCallbackResponse>, ErrorResponse> {
    let k1 = required("k1", params.k1).map_err(reject)?;
    let remote_id = required("remote_id", params.remote_id).map_err(reject)?;
    let amount_sat = parse_amount("amount", params.amount).map_err(reject)?;
    let private = parse_flag("private", params.private).map_err(reject)?;
    validate_node_id(&remote_id).map_err(reject)?;

    state
        .challenges
        .redeem(&k1, Tag::ChannelRequest)
        .await
        .map_err(reject)?;

    let result = state
        .node
        .fund_channel(&remote_id, amount_sat, !private)
        .await
        .map_err(reject)?;

    info!(%remote_id, amount_sat, private, txid = %result.txid, "channel opened");
    Ok(Json(ChannelCallbackResponse {
        status: Status::Ok,
        result,
    }))
}

/// Compressed secp256k1 public key, hex encoded.
fn validate_node_id(node_id: &str) -> Result<(), LnurlError> {
    let bytes = hex::decode(node_id)
        .map_err(|_| LnurlError::Protocol("remote_id is not hex".into()))?;
    if bytes.len() != 33 || !matches!(bytes[0], 0x02 | 0x03) {
        return Err(LnurlError::Protocol(
            "remote_id is not a compressed public key".into(),
        ));
    }
    Ok(())
}
