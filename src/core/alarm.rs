use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input formats accepted for an alarm time, all in local time.
const INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// A pending one-shot reminder for a single note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub note_id: Uuid,
    pub trigger_time: DateTime<Utc>,
    /// Title of the note when the alarm was set. Later renames are not reflected.
    pub note_title: String,
}

impl Alarm {
    pub fn new(note_id: Uuid, trigger_time: DateTime<Utc>, note_title: impl Into<String>) -> Self {
        Self {
            note_id,
            trigger_time,
            note_title: note_title.into(),
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.trigger_time <= now
    }

    /// Text shown when the alarm fires.
    pub fn message(&self) -> String {
        format!("Alarm for note: \"{}\"", self.note_title)
    }
}

/// Parse a local date-time such as `2026-03-01T09:30` into an absolute instant.
///
/// Ambiguous local times (DST fold) resolve to the earlier instant; times that
/// do not exist locally (DST gap) are rejected.
pub fn parse_alarm_input(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    let naive = INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
}

/// Render an instant the way the alarm input expects it back.
pub fn format_alarm_input(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%dT%H:%M").to_string()
}

/// Confirmation shown after an alarm has been accepted.
pub fn confirmation(time: DateTime<Utc>) -> String {
    format!(
        "Alarm set for {}",
        time.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    )
}
