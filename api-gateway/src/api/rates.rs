//! Interest rate API handlers

use std::sync::Arc;

use axum::extract::State;
use rate_feed::RateSheet;

use crate::api::response::ApiResponse;
use crate::error::ApiError;
use crate::AppState;

/// Get the current interest-rate sheet
#[utoipa::path(
    get,
    path = "/api/v1/rates",
    responses(
        (status = 200, description = "Rate sheet retrieved successfully", body = RateSheet)
    ),
    tag = "rates"
)]
pub async fn get_rates(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<RateSheet>, ApiError> {
    // Best-effort feed: unreachable sources degrade to fallback rates.
    let sheet = state.rate_feed.current_rates().await;
    Ok(ApiResponse::new(sheet))
}
