use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};

use crate::dto::interview_dto::LanguageQuery;
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::services::report_service::{self, FeedbackReport};
use crate::services::translation_service::is_base_language;
use crate::AppState;

async fn build_report(
    state: &AppState,
    mock_id: &str,
    language: &str,
    owner: &str,
) -> Result<FeedbackReport> {
    let interview = state.interview_service.find_by_mock_id(mock_id).await?;
    let answers = state.answer_service.list_for_interview(mock_id).await?;
    let violations = state.violation_service.latest_record(mock_id, owner).await?;

    let mut report = report_service::compile(
        mock_id,
        interview.as_ref(),
        &answers,
        violations.as_ref(),
        owner,
    );

    if !is_base_language(language) && !report.is_empty() {
        if let Some(translated) = state
            .translation
            .translate_feedback(mock_id, &report.items_as_json(), language)
            .await
        {
            report.apply_translation(translated, language);
        }
    }
    Ok(report)
}

#[axum::debug_handler]
pub async fn get_feedback(
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
    Query(query): Query<LanguageQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<FeedbackReport>> {
    let report = build_report(&state, &mock_id, query.language(), claims.owner()).await?;
    Ok(Json(report))
}

#[axum::debug_handler]
pub async fn download_text_report(
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
    Query(query): Query<LanguageQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let report = build_report(&state, &mock_id, query.language(), claims.owner()).await?;
    let body = report_service::render_text(&report);
    let disposition = format!("attachment; filename=\"interview-report-{}.md\"", mock_id);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

#[axum::debug_handler]
pub async fn download_xlsx_report(
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
    Query(query): Query<LanguageQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let report = build_report(&state, &mock_id, query.language(), claims.owner()).await?;
    let buffer = report_service::render_xlsx(&report)?;
    let disposition = format!("attachment; filename=\"interview-report-{}.xlsx\"", mock_id);

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}
