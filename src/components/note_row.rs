use chime::core::alarm::format_alarm_input;
use chime::core::note::Note;
use uuid::Uuid;

/// One line of the note list: active marker, short id, title, alarm marker.
pub fn note_row(note: &Note, active: Option<Uuid>) -> String {
    let marker = if active == Some(note.id) { '>' } else { ' ' };
    let mut row = format!("{} {}  {}", marker, note.short_id(), note.title);
    if let Some(alarm) = note.alarm {
        row.push_str(&format!("  [alarm {}]", format_alarm_input(alarm)));
    }
    row
}
