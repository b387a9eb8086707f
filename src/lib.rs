pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use crate::config::Config;
use crate::error::Result;
use crate::middleware::{
    auth::require_bearer_auth,
    cors::permissive_cors,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::services::{
    ai_client::{OpenAiClient, PromptClient},
    answer_service::AnswerService,
    custom_qna_service::CustomQnaService,
    interview_service::InterviewService,
    proctoring_service::{ProctoringRegistry, ViolationService},
    translation_service::TranslationService,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub interview_service: InterviewService,
    pub answer_service: AnswerService,
    pub custom_qna_service: CustomQnaService,
    pub violation_service: ViolationService,
    pub proctoring: ProctoringRegistry,
    pub translation: TranslationService,
}

impl AppState {
    pub fn new(pool: PgPool, config: Arc<Config>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;
        let ai: Arc<dyn PromptClient> = Arc::new(OpenAiClient::new(
            config.ai_api_key.clone(),
            config.ai_api_url.clone(),
            config.ai_model.clone(),
            http_client,
        ));
        Ok(Self::with_client(pool, config, ai))
    }

    /// Same wiring with a caller-supplied model client.
    pub fn with_client(pool: PgPool, config: Arc<Config>, ai: Arc<dyn PromptClient>) -> Self {
        let interview_service =
            InterviewService::new(pool.clone(), ai.clone(), config.interview_question_count);
        let answer_service = AnswerService::new(pool.clone(), ai.clone());
        let custom_qna_service = CustomQnaService::new(pool.clone(), ai.clone(), config.custom_qa_count);
        let violation_service = ViolationService::new(pool.clone());
        let translation = TranslationService::new(ai);

        Self {
            pool,
            config,
            interview_service,
            answer_service,
            custom_qna_service,
            violation_service,
            proctoring: ProctoringRegistry::new(),
            translation,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/api/interviews",
            post(routes::interviews::create_interview).get(routes::interviews::list_interviews),
        )
        .route("/api/interviews/:mock_id", get(routes::interviews::get_interview))
        .route(
            "/api/interviews/:mock_id/answers",
            post(routes::answers::record_answer).get(routes::answers::list_answers),
        )
        .route("/api/interviews/:mock_id/video", post(routes::upload::upload_video))
        .route(
            "/api/interviews/:mock_id/violations",
            post(routes::violations::record_violation).get(routes::violations::violation_status),
        )
        .route("/api/interviews/:mock_id/end", post(routes::violations::end_interview))
        .route("/api/interviews/:mock_id/feedback", get(routes::reports::get_feedback))
        .route(
            "/api/interviews/:mock_id/report.md",
            get(routes::reports::download_text_report),
        )
        .route(
            "/api/interviews/:mock_id/report.xlsx",
            get(routes::reports::download_xlsx_report),
        )
        .route(
            "/api/custom-questions",
            post(routes::custom_questions::create_custom_set)
                .get(routes::custom_questions::list_custom_sets),
        )
        .route("/api/custom-questions/:id", get(routes::custom_questions::get_custom_set))
        .route("/api/practice/domains", get(routes::custom_questions::practice_domains))
        .route("/api/translate/ui", post(routes::translate::translate_ui))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_bearer_auth))
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new(state.config.api_rps),
            rps_middleware,
        ));

    let videos_dir = std::path::Path::new(&state.config.uploads_dir).join("videos");
    let body_limit = state.config.max_upload_mb * 1024 * 1024;

    Router::new()
        .route("/health", get(routes::health::health))
        .merge(api)
        .nest_service("/videos", ServeDir::new(videos_dir))
        .with_state(state)
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
}
