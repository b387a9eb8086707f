use axum::{
    extract::{Multipart, Path, State},
    Json,
};

use crate::dto::answer_dto::UploadVideoResponse;
use crate::error::{Error, Result};
use crate::AppState;

/// Final path component of a client-supplied name, if it has one.
pub fn safe_file_name(name: &str) -> Option<String> {
    std::path::Path::new(name.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Fallback name when the client sends none; the path segment is reduced to
/// file-name-safe characters.
pub fn default_video_name(mock_id: &str, millis: i64) -> String {
    let cleaned: String = mock_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let name = format!("interview-{}-{}.webm", cleaned, millis);
    safe_file_name(&name).unwrap_or_else(|| format!("interview-{}.webm", millis))
}

#[axum::debug_handler]
pub async fn upload_video(
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadVideoResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .and_then(safe_file_name)
            .unwrap_or_else(|| {
                default_video_name(&mock_id, chrono::Utc::now().timestamp_millis())
            });
        let data = field.bytes().await?;

        let upload_dir = std::path::Path::new(&state.config.uploads_dir).join("videos");
        tokio::fs::create_dir_all(&upload_dir).await?;
        tokio::fs::write(upload_dir.join(&file_name), &data).await?;

        tracing::info!(%mock_id, file = %file_name, bytes = data.len(), "Interview video saved");
        return Ok(Json(UploadVideoResponse {
            success: true,
            file_path: format!("/videos/{}", file_name),
        }));
    }

    Err(Error::BadRequest("No file uploaded".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_reduced_to_last_component() {
        assert_eq!(safe_file_name("answer.webm").as_deref(), Some("answer.webm"));
        assert_eq!(safe_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(safe_file_name("clips/q1.webm").as_deref(), Some("q1.webm"));
        assert_eq!(safe_file_name(".."), None);
        assert_eq!(safe_file_name(""), None);
    }

    #[test]
    fn default_name_cannot_escape_the_videos_dir() {
        assert_eq!(default_video_name("abc-123", 5), "interview-abc-123-5.webm");
        assert_eq!(default_video_name("../x/y", 5), "interview-___x_y-5.webm");
        assert_eq!(default_video_name("a\\b", 7), "interview-a_b-7.webm");
    }
}
