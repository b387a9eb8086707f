pub mod answer_dto;
pub mod custom_qna_dto;
pub mod interview_dto;
pub mod proctoring_dto;
pub mod translation_dto;
