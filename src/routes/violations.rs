use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::dto::proctoring_dto::{
    EndInterviewResponse, ViolationEventRequest, ViolationStatusResponse,
};
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::models::violation::ViolationCounts;
use crate::services::proctoring_service::SessionKey;
use crate::AppState;

#[axum::debug_handler]
pub async fn record_violation(
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ViolationEventRequest>,
) -> Json<ViolationCounts> {
    let key = SessionKey::new(mock_id, claims.owner());
    let counts = state.proctoring.record(&key, req.kind).await;
    tracing::warn!(
        mock_id = %key.mock_id,
        owner = %key.owner,
        kind = ?req.kind,
        total = counts.total(),
        "Proctoring violation reported"
    );
    Json(counts)
}

#[axum::debug_handler]
pub async fn violation_status(
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ViolationStatusResponse>> {
    let key = SessionKey::new(mock_id, claims.owner());
    let live = state.proctoring.snapshot(&key).await;
    let stored = state
        .violation_service
        .latest_record(&key.mock_id, &key.owner)
        .await?;
    Ok(Json(ViolationStatusResponse { live, stored }))
}

#[axum::debug_handler]
pub async fn end_interview(
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<EndInterviewResponse>> {
    let key = SessionKey::new(mock_id, claims.owner());
    let service = state.violation_service.clone();
    let (mock_id, owner) = (key.mock_id.clone(), key.owner.clone());
    let record = state
        .proctoring
        .finalize(&key, |counts| async move {
            service.insert_record(&mock_id, &owner, counts).await
        })
        .await?;

    Ok(Json(EndInterviewResponse {
        feedback_path: format!("/api/interviews/{}/feedback", record.mock_id_ref),
        record,
    }))
}
