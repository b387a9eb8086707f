pub mod answer;
pub mod custom_qna;
pub mod interview;
pub mod question;
pub mod violation;
