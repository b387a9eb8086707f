use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use validator::Validate;

use crate::dto::custom_qna_dto::{CreateCustomQnaPayload, CustomQnaResponse, PracticeCatalog};
use crate::dto::interview_dto::LanguageQuery;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::custom_qna::{CustomQnaSet, CustomQnaSummary};
use crate::services::custom_qna_service::practice_catalog;
use crate::AppState;

fn untranslated(set: CustomQnaSet) -> CustomQnaResponse {
    CustomQnaResponse {
        id: set.id,
        domain: set.domain,
        skills: set.skills,
        experience: set.experience,
        language: "en".to_string(),
        translated: false,
        items: set.json_qna,
        created_at: set.created_at,
    }
}

#[axum::debug_handler]
pub async fn create_custom_set(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCustomQnaPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let set = state
        .custom_qna_service
        .generate(&payload, claims.owner())
        .await?;
    Ok((StatusCode::CREATED, Json(untranslated(set))))
}

#[axum::debug_handler]
pub async fn list_custom_sets(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<CustomQnaSummary>>> {
    let rows = state.custom_qna_service.list_for_owner(claims.owner()).await?;
    Ok(Json(rows))
}

#[axum::debug_handler]
pub async fn get_custom_set(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<CustomQnaResponse>> {
    let set = state
        .custom_qna_service
        .find(id)
        .await?
        .ok_or_else(|| Error::NotFound("not_found".to_string()))?;

    let language = query.language();
    let translated = state
        .translation
        .translate_qna(set.id, &set.json_qna, language)
        .await;

    let mut response = untranslated(set);
    if let Some(items) = translated {
        response.items = items;
        response.language = language.to_string();
        response.translated = true;
    }
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn practice_domains() -> Json<PracticeCatalog> {
    Json(practice_catalog())
}
