use crate::error::Result;
use crate::models::answer::UserAnswer;
use crate::models::interview::MockInterview;
use crate::models::violation::ViolationRecord;
use chrono::{DateTime, Utc};
use rust_xlsxwriter::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fmt::Write as _;

/// Number of answers shown in a report.
pub const REPORT_ANSWER_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub question: String,
    pub rating: Option<i32>,
    pub user_ans: Option<String>,
    pub correct_ans: Option<String>,
    pub feedback: Option<String>,
}

impl From<&UserAnswer> for FeedbackItem {
    fn from(answer: &UserAnswer) -> Self {
        Self {
            question: answer.question.clone(),
            rating: answer.rating,
            user_ans: answer.user_ans.clone(),
            correct_ans: answer.correct_ans.clone(),
            feedback: answer.feedback.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViolationSummary {
    pub face_absent: i32,
    pub focus_lost: i32,
    pub unauthorized_item: i32,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl From<&ViolationRecord> for ViolationSummary {
    fn from(record: &ViolationRecord) -> Self {
        Self {
            face_absent: record.face_absent,
            focus_lost: record.focus_loss,
            unauthorized_item: record.unauthorized_item,
            recorded_at: Some(record.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackReport {
    pub user_email: String,
    pub mock_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub job_position: Option<String>,
    pub job_experience: Option<String>,
    pub overall_rating: i32,
    pub violations: ViolationSummary,
    pub items: Vec<FeedbackItem>,
    pub language: String,
    pub translated: bool,
}

impl FeedbackReport {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items_as_json(&self) -> Vec<JsonValue> {
        self.items
            .iter()
            .filter_map(|item| serde_json::to_value(item).ok())
            .collect()
    }

    /// Overlays translated text fields onto the items. Ratings always come
    /// from the stored answers; a reply with the wrong length or a
    /// non-object item leaves the report untouched.
    pub fn apply_translation(&mut self, translated: Vec<JsonValue>, language: &str) {
        if translated.len() != self.items.len() {
            tracing::warn!(mock_id = %self.mock_id, "translated feedback length mismatch");
            return;
        }
        if translated.iter().any(|item| !item.is_object()) {
            tracing::warn!(mock_id = %self.mock_id, "translated feedback has wrong shape");
            return;
        }

        for (item, value) in self.items.iter_mut().zip(&translated) {
            let text = |key: &str| {
                value
                    .get(key)
                    .and_then(|v| v.as_str())
                    .filter(|v| !v.trim().is_empty())
                    .map(str::to_string)
            };
            if let Some(question) = text("question") {
                item.question = question;
            }
            if let Some(user_ans) = text("userAns") {
                item.user_ans = Some(user_ans);
            }
            if let Some(correct_ans) = text("correctAns") {
                item.correct_ans = Some(correct_ans);
            }
            if let Some(feedback) = text("feedback") {
                item.feedback = Some(feedback);
            }
        }
        self.language = language.to_string();
        self.translated = true;
    }
}

/// First answer per distinct question text, in the given order, capped.
pub fn unique_first_answers(answers: &[UserAnswer]) -> Vec<&UserAnswer> {
    let mut seen = HashSet::new();
    answers
        .iter()
        .filter(|a| seen.insert(a.question.as_str()))
        .take(REPORT_ANSWER_LIMIT)
        .collect()
}

/// One point for a rating of 5 or less (or none), two above that.
pub fn overall_rating<I>(ratings: I) -> i32
where
    I: IntoIterator<Item = Option<i32>>,
{
    ratings
        .into_iter()
        .map(|r| match r {
            Some(v) if v > 5 => 2,
            _ => 1,
        })
        .sum()
}

pub fn compile(
    mock_id: &str,
    interview: Option<&MockInterview>,
    answers: &[UserAnswer],
    violations: Option<&ViolationRecord>,
    owner: &str,
) -> FeedbackReport {
    let selected = unique_first_answers(answers);
    let items: Vec<FeedbackItem> = selected.iter().map(|a| FeedbackItem::from(*a)).collect();
    let overall = overall_rating(items.iter().map(|i| i.rating));

    FeedbackReport {
        user_email: owner.to_string(),
        mock_id: mock_id.to_string(),
        created_at: interview.map(|i| i.created_at),
        job_position: interview.map(|i| i.job_position.clone()),
        job_experience: interview.map(|i| i.job_experience.clone()),
        overall_rating: overall,
        violations: violations.map(ViolationSummary::from).unwrap_or_default(),
        items,
        language: "en".to_string(),
        translated: false,
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("-")
}

fn rating_label(rating: Option<i32>) -> String {
    rating.map(|r| r.to_string()).unwrap_or_else(|| "N/A".to_string())
}

pub fn render_text(report: &FeedbackReport) -> String {
    let mut out = String::new();

    writeln!(out, "# Interview Feedback Report").ok();
    writeln!(out).ok();
    writeln!(out, "- User: {}", report.user_email).ok();
    writeln!(out, "- Interview ID: {}", report.mock_id).ok();
    writeln!(
        out,
        "- Date: {}",
        report
            .created_at
            .map(|d| d.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string())
    )
    .ok();
    writeln!(out, "- Position: {}", or_dash(report.job_position.as_deref())).ok();
    writeln!(out, "- Experience: {}", or_dash(report.job_experience.as_deref())).ok();
    writeln!(out, "- Overall Rating: {}/10", report.overall_rating).ok();
    writeln!(out).ok();

    writeln!(out, "## Violations Summary").ok();
    writeln!(out).ok();
    let v = &report.violations;
    match v.recorded_at {
        Some(at) => writeln!(out, "Recorded at {}", at.format("%Y-%m-%d %H:%M:%S")).ok(),
        None => writeln!(out, "No violation record stored.").ok(),
    };
    writeln!(out, "- Face absent: {}", v.face_absent).ok();
    writeln!(out, "- Focus lost: {}", v.focus_lost).ok();
    writeln!(out, "- Unauthorized item: {}", v.unauthorized_item).ok();
    writeln!(out).ok();

    writeln!(out, "## Question-wise Feedback").ok();
    writeln!(out).ok();
    if report.items.is_empty() {
        writeln!(out, "No interview feedback recorded.").ok();
        return out;
    }

    for (idx, item) in report.items.iter().enumerate() {
        writeln!(out, "### {}. {}", idx + 1, item.question).ok();
        writeln!(out).ok();
        writeln!(out, "- Rating: {}", rating_label(item.rating)).ok();
        writeln!(out, "- Your answer: {}", or_dash(item.user_ans.as_deref())).ok();
        writeln!(out, "- Correct answer: {}", or_dash(item.correct_ans.as_deref())).ok();
        writeln!(out, "- Feedback: {}", or_dash(item.feedback.as_deref())).ok();
        writeln!(out).ok();
    }

    out
}

/// One-sheet styled workbook with the header block and the question table.
pub fn render_xlsx(report: &FeedbackReport) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Feedback")?;

    let primary_color = Color::RGB(0x1E293B);
    let header_bg = Color::RGB(0x0F172A);
    let alt_row_1 = Color::RGB(0xF8FAFC);
    let alt_row_2 = Color::White;
    let border_color = Color::RGB(0xE2E8F0);
    let rating_high = Color::RGB(0x10B981);
    let rating_low = Color::RGB(0xEF4444);

    let columns = [
        ("#", 6.0),
        ("Question", 45.0),
        ("Rating", 10.0),
        ("Your Answer", 50.0),
        ("Correct Answer", 50.0),
        ("Feedback", 50.0),
    ];
    let last_col = (columns.len() - 1) as u16;
    for (i, (_, width)) in columns.iter().enumerate() {
        worksheet.set_column_width(i as u16, *width)?;
    }

    let title_format = Format::new()
        .set_font_size(16)
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(primary_color)
        .set_align(FormatAlign::CenterAcross)
        .set_align(FormatAlign::VerticalCenter);
    worksheet.set_row_height(0, 36)?;
    worksheet.merge_range(0, 0, 0, last_col, "Interview Feedback Report", &title_format)?;

    let info_format = Format::new()
        .set_font_size(10)
        .set_font_color(primary_color)
        .set_align(FormatAlign::VerticalCenter);
    let label_format = info_format.clone().set_bold();

    let date = report
        .created_at
        .map(|d| d.format("%d.%m.%Y %H:%M UTC").to_string())
        .unwrap_or_else(|| "-".to_string());
    let info_rows = [
        ("User", report.user_email.clone()),
        ("Interview ID", report.mock_id.clone()),
        ("Date", date),
        ("Position", or_dash(report.job_position.as_deref()).to_string()),
        ("Experience", or_dash(report.job_experience.as_deref()).to_string()),
        ("Overall Rating", format!("{}/10", report.overall_rating)),
        (
            "Violations",
            format!(
                "Face absent: {} | Focus lost: {} | Unauthorized item: {}",
                report.violations.face_absent,
                report.violations.focus_lost,
                report.violations.unauthorized_item
            ),
        ),
    ];
    for (i, (label, value)) in info_rows.iter().enumerate() {
        let row = 1 + i as u32;
        worksheet.write_string_with_format(row, 0, *label, &label_format)?;
        worksheet.merge_range(row, 1, row, last_col, value, &info_format)?;
    }

    let header_row = 1 + info_rows.len() as u32 + 1;
    let header_format = Format::new()
        .set_bold()
        .set_font_size(10)
        .set_font_color(Color::White)
        .set_background_color(header_bg)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_border_color(border_color);
    worksheet.set_row_height(header_row, 26)?;
    for (i, (name, _)) in columns.iter().enumerate() {
        worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
    }

    let data_start_row = header_row + 1;
    if report.items.is_empty() {
        worksheet.merge_range(
            data_start_row,
            0,
            data_start_row,
            last_col,
            "No interview feedback recorded.",
            &info_format.clone().set_italic(),
        )?;
    }

    for (idx, item) in report.items.iter().enumerate() {
        let row = data_start_row + idx as u32;
        let bg = if idx % 2 == 0 { alt_row_1 } else { alt_row_2 };

        let base_fmt = Format::new()
            .set_font_size(10)
            .set_background_color(bg)
            .set_align(FormatAlign::Top)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);
        let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);
        let wrap_fmt = base_fmt.clone().set_text_wrap();

        worksheet.write_number_with_format(row, 0, (idx + 1) as f64, &center_fmt)?;
        worksheet.write_string_with_format(row, 1, &item.question, &wrap_fmt.clone().set_bold())?;

        match item.rating {
            Some(rating) => {
                let color = if rating > 5 { rating_high } else { rating_low };
                let rating_fmt = center_fmt.clone().set_bold().set_font_color(color);
                worksheet.write_number_with_format(row, 2, rating as f64, &rating_fmt)?;
            }
            None => {
                worksheet.write_string_with_format(row, 2, "N/A", &center_fmt)?;
            }
        }

        worksheet.write_string_with_format(row, 3, or_dash(item.user_ans.as_deref()), &wrap_fmt)?;
        worksheet.write_string_with_format(row, 4, or_dash(item.correct_ans.as_deref()), &wrap_fmt)?;
        worksheet.write_string_with_format(row, 5, or_dash(item.feedback.as_deref()), &wrap_fmt)?;
    }

    worksheet.set_freeze_panes(data_start_row, 0)?;

    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(id: i32, question: &str, rating: Option<i32>) -> UserAnswer {
        UserAnswer {
            id,
            mock_id_ref: "mock-1".into(),
            question: question.into(),
            correct_ans: Some("reference".into()),
            user_ans: Some(format!("answer {}", id)),
            feedback: Some("ok".into()),
            rating,
            user_email: Some("alice@example.com".into()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn overall_rating_scores_one_or_two_points() {
        let ratings = [3, 6, 5, 9, 2].map(Some);
        assert_eq!(overall_rating(ratings), 7);
        assert_eq!(overall_rating([None, Some(10)]), 3);
        assert_eq!(overall_rating(std::iter::empty()), 0);
    }

    #[test]
    fn overall_rating_never_exceeds_ten_for_a_report() {
        let answers: Vec<_> = (1..=8).map(|i| answer(i, &format!("Q{}", i), Some(10))).collect();
        let report = compile("mock-1", None, &answers, None, "alice@example.com");
        assert_eq!(report.items.len(), REPORT_ANSWER_LIMIT);
        assert_eq!(report.overall_rating, 10);
    }

    #[test]
    fn first_answer_per_question_wins() {
        let answers = vec![
            answer(1, "Q1", Some(4)),
            answer(2, "Q2", Some(8)),
            answer(3, "Q1", Some(10)),
        ];
        let unique = unique_first_answers(&answers);
        let ids: Vec<_> = unique.iter().map(|a| a.id).collect();
        assert_eq!(ids, [1, 2]);
        assert_eq!(unique[0].rating, Some(4));
    }

    #[test]
    fn missing_interview_and_violations_compile_to_defaults() {
        let report = compile("mock-404", None, &[], None, "alice@example.com");
        assert!(report.is_empty());
        assert_eq!(report.overall_rating, 0);
        assert_eq!(report.violations, ViolationSummary::default());
        assert!(report.job_position.is_none());

        let text = render_text(&report);
        assert!(text.contains("Overall Rating: 0/10"));
        assert!(text.contains("No interview feedback recorded."));
        assert!(text.contains("No violation record stored."));
    }

    #[test]
    fn text_report_lists_each_question() {
        let answers = vec![answer(1, "What is Rust?", Some(7)), answer(2, "What is Tokio?", None)];
        let report = compile("mock-1", None, &answers, None, "alice@example.com");
        let text = render_text(&report);
        assert!(text.contains("### 1. What is Rust?"));
        assert!(text.contains("- Rating: 7"));
        assert!(text.contains("### 2. What is Tokio?"));
        assert!(text.contains("- Rating: N/A"));
    }

    #[test]
    fn translation_overlays_text_and_keeps_ratings() {
        let answers = vec![answer(1, "What is Rust?", Some(7))];
        let mut report = compile("mock-1", None, &answers, None, "alice@example.com");

        let mut translated = report.items_as_json();
        translated[0]["question"] = JsonValue::String("रस्ट क्या है?".into());
        translated[0]["rating"] = JsonValue::String("7".into());
        report.apply_translation(translated, "hi");
        assert!(report.translated);
        assert_eq!(report.language, "hi");
        assert_eq!(report.items[0].question, "रस्ट क्या है?");
        assert_eq!(report.items[0].rating, Some(7));
        assert_eq!(report.items[0].feedback.as_deref(), Some("ok"));
    }

    #[test]
    fn malformed_translation_is_ignored() {
        let answers = vec![answer(1, "What is Rust?", Some(7)), answer(2, "What is Tokio?", None)];
        let mut report = compile("mock-1", None, &answers, None, "alice@example.com");

        report.apply_translation(vec![serde_json::json!({"question": "एक"})], "hi");
        assert!(!report.translated);

        report.apply_translation(vec![serde_json::json!("oops"), serde_json::json!({})], "hi");
        assert!(!report.translated);
        assert_eq!(report.items[0].question, "What is Rust?");
    }

    #[test]
    fn workbook_renders_to_bytes() {
        let answers = vec![answer(1, "What is Rust?", Some(7))];
        let report = compile("mock-1", None, &answers, None, "alice@example.com");
        let bytes = render_xlsx(&report).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
