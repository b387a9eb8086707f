pub mod answers;
pub mod custom_questions;
pub mod health;
pub mod interviews;
pub mod reports;
pub mod translate;
pub mod upload;
pub mod violations;
