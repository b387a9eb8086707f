use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use validator::Validate;

use crate::dto::answer_dto::RecordAnswerRequest;
use crate::dto::interview_dto::LanguageQuery;
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::models::answer::UserAnswer;
use crate::routes::interviews::load_interview;
use crate::AppState;

#[axum::debug_handler]
pub async fn record_answer(
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
    Query(query): Query<LanguageQuery>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RecordAnswerRequest>,
) -> Result<impl IntoResponse> {
    req.validate()?;
    let interview = load_interview(&state, &mock_id).await?;
    let answer = state
        .answer_service
        .record(
            &interview,
            req.question_index as usize,
            &req.user_answer,
            query.language(),
            claims.owner(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(answer)))
}

#[axum::debug_handler]
pub async fn list_answers(
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
) -> Result<Json<Vec<UserAnswer>>> {
    let answers = state.answer_service.list_for_interview(&mock_id).await?;
    Ok(Json(answers))
}
