use axum::{extract::State, Extension, Json};
use fxdash_core::NewsReport;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Runs the fetch, parse and annotate pipeline on demand.
pub(super) async fn get_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<NewsReport>>, ApiError> {
    match state.pipeline.run_with_retry().await {
        Ok(report) => {
            tracing::info!(
                request_id = %req_id.0,
                items = report.items.len(),
                fallbacks = report.fallback_count(),
                "news report served"
            );
            Ok(Json(ApiResponse {
                data: report,
                meta: ResponseMeta::new(req_id.0),
            }))
        }
        Err(e) => {
            tracing::error!(request_id = %req_id.0, error = %e, "news pipeline failed");
            Err(ApiError::new(req_id.0, "upstream_error", e.to_string()))
        }
    }
}
