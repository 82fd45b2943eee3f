use axum::{Json, http::StatusCode};
use thiserror::Error;

use crate::{
    lightning::NodeRpcError,
    protocol::{BoundsError, ChallengeError, StatusResponse, VerificationError},
};

pub type LnurlResult<T, E = LnurlError> = Result<T, E>;

#[derive(Debug, Error)]
pub enum LnurlError {
    /// Malformed or unexpected message shape or tag
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error(transparent)]
    Bounds(#[from] BoundsError),
    /// Invoice does not commit to the metadata or the amount. Never retried.
    #[error("invoice verification failed: {0}")]
    Verification(#[from] VerificationError),
    /// Non-2xx status or an explicit `{"status": "ERROR"}` from the remote
    #[error("callback error: {0}")]
    Callback(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("node rpc error: {0}")]
    NodeRpc(#[from] NodeRpcError),
    /// The node timed out while paying. The payment may have gone out.
    #[error("payment status unknown: {0}")]
    PaymentStatusUnknown(String),
    #[error("invoice creation failed: {0}")]
    InvoiceCreation(String),
    #[error(transparent)]
    Challenge(#[from] ChallengeError),
}

impl LnurlError {
    /// Whether a caller may retry the same step, with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Callback(_) | Self::Transport(_))
    }

    /// A `pay` that timed out may still settle.
    pub fn from_payment(err: NodeRpcError) -> Self {
        if err.is_timeout() {
            Self::PaymentStatusUnknown(err.to_string())
        } else {
            Self::NodeRpc(err)
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Protocol(_) | Self::Bounds(_) | Self::Challenge(_) | Self::Verification(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Callback(_) | Self::Transport(_) => StatusCode::BAD_GATEWAY,
            Self::NodeRpc(_) | Self::PaymentStatusUnknown(_) | Self::InvoiceCreation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// LNURL error body, `{"status": "ERROR", "reason": ...}`.
pub type ErrorResponse = (StatusCode, Json<StatusResponse>);

pub fn error_response(status: StatusCode, reason: &str) -> ErrorResponse {
    (status, Json(StatusResponse::error(reason)))
}

pub fn lnurl_error(err: &LnurlError) -> ErrorResponse {
    error_response(err.status_code(), &err.to_string())
}
