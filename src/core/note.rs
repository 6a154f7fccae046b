use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_TITLE: &str = "Untitled Note";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    /// Markup-bearing body, stored as the editor produced it.
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Trigger time of the pending alarm, mirrored from the alarm store.
    pub alarm: Option<DateTime<Utc>>,
}

impl Note {
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: String::new(),
            created_at: now,
            updated_at: now,
            alarm: None,
        }
    }

    /// First eight characters of the id, enough to address a note by hand.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}
