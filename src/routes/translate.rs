use axum::{extract::State, Json};
use validator::Validate;

use crate::dto::translation_dto::{TranslateUiRequest, TranslateUiResponse};
use crate::error::Result;
use crate::services::translation_service::BASE_LANGUAGE;
use crate::AppState;

/// Always answers; falls back to the submitted strings when translation is
/// unavailable.
#[axum::debug_handler]
pub async fn translate_ui(
    State(state): State<AppState>,
    Json(req): Json<TranslateUiRequest>,
) -> Result<Json<TranslateUiResponse>> {
    req.validate()?;
    let language = if req.language.trim().is_empty() {
        BASE_LANGUAGE.to_string()
    } else {
        req.language.trim().to_string()
    };
    let texts = state
        .translation
        .translate_ui(&req.namespace, &req.texts, &language)
        .await;
    Ok(Json(TranslateUiResponse { language, texts }))
}
