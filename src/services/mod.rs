pub mod ai_client;
pub mod answer_service;
pub mod custom_qna_service;
pub mod extraction;
pub mod interview_service;
pub mod proctoring_service;
pub mod report_service;
pub mod translation_service;
