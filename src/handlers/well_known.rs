use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::error;

use crate::{
    app_state::AppState,
    error::{ErrorResponse, error_response},
    protocol::PayRequest,
};

/// GET /.well-known/lnurlp/{user}
/// Pre-published pay request for a lightning address
pub async fn well_known_pay(
    Path(user): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PayRequest>, ErrorResponse> {
    match state.documents.lookup(&user).await {
        Ok(Some(document)) => Ok(Json(document)),
        Ok(None) => Err(error_response(StatusCode::NOT_FOUND, "unknown user")),
        Err(e) => {
            error!(%user, error = %e, "failed to load pay document");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "pay document unavailable",
            ))
        }
    }
}
