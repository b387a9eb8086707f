use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    FaceAbsent,
    FocusLost,
    MultipleFaces,
    UnauthorizedItem,
}

/// Live per-session tally. Counters only ever increase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationCounts {
    pub face_absent: i32,
    pub focus_lost: i32,
    pub multiple_faces: i32,
    pub unauthorized_item: i32,
}

impl ViolationCounts {
    pub fn record(&mut self, kind: ViolationKind) {
        let slot = match kind {
            ViolationKind::FaceAbsent => &mut self.face_absent,
            ViolationKind::FocusLost => &mut self.focus_lost,
            ViolationKind::MultipleFaces => &mut self.multiple_faces,
            ViolationKind::UnauthorizedItem => &mut self.unauthorized_item,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn get(&self, kind: ViolationKind) -> i32 {
        match kind {
            ViolationKind::FaceAbsent => self.face_absent,
            ViolationKind::FocusLost => self.focus_lost,
            ViolationKind::MultipleFaces => self.multiple_faces,
            ViolationKind::UnauthorizedItem => self.unauthorized_item,
        }
    }

    pub fn total(&self) -> i32 {
        self.face_absent + self.focus_lost + self.multiple_faces + self.unauthorized_item
    }

    /// Counts left after removing an already persisted snapshot, floored at zero.
    pub fn without(&self, written: &ViolationCounts) -> ViolationCounts {
        ViolationCounts {
            face_absent: (self.face_absent - written.face_absent).max(0),
            focus_lost: (self.focus_lost - written.focus_lost).max(0),
            multiple_faces: (self.multiple_faces - written.multiple_faces).max(0),
            unauthorized_item: (self.unauthorized_item - written.unauthorized_item).max(0),
        }
    }
}

/// Persisted end-of-session aggregate. `multiple_faces` is not stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ViolationRecord {
    pub id: i32,
    pub mock_id_ref: String,
    pub user_email: String,
    pub face_absent: i32,
    pub focus_loss: i32,
    pub unauthorized_item: i32,
    pub created_at: DateTime<Utc>,
}
