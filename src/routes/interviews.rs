use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use validator::Validate;

use crate::dto::interview_dto::{
    CreateInterviewPayload, InterviewResponse, InterviewSummary, LanguageQuery,
};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::interview::MockInterview;
use crate::AppState;

/// An unknown interview is a plain 404, never a server error.
pub(crate) fn require_interview(found: Option<MockInterview>) -> Result<MockInterview> {
    found.ok_or_else(|| Error::NotFound("not_found".to_string()))
}

pub(crate) async fn load_interview(state: &AppState, mock_id: &str) -> Result<MockInterview> {
    require_interview(state.interview_service.find_by_mock_id(mock_id).await?)
}

#[axum::debug_handler]
pub async fn create_interview(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let interview = state
        .interview_service
        .generate(&payload, query.language(), claims.owner())
        .await?;
    Ok((StatusCode::CREATED, Json(InterviewResponse::from(interview))))
}

#[axum::debug_handler]
pub async fn list_interviews(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<InterviewSummary>>> {
    let rows = state.interview_service.list_for_owner(claims.owner()).await?;
    Ok(Json(rows.into_iter().map(InterviewSummary::from).collect()))
}

#[axum::debug_handler]
pub async fn get_interview(
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
) -> Result<Json<InterviewResponse>> {
    let interview = load_interview(&state, &mock_id).await?;
    Ok(Json(InterviewResponse::from(interview)))
}
