use serde::{Deserialize, Serialize};

use crate::models::violation::{ViolationCounts, ViolationKind, ViolationRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationEventRequest {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViolationStatusResponse {
    pub live: ViolationCounts,
    pub stored: Option<ViolationRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndInterviewResponse {
    pub record: ViolationRecord,
    pub feedback_path: String,
}
