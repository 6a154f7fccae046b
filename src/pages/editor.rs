use chime::core::alarm::format_alarm_input;
use chime::core::note::Note;

/// The open note: title, pending alarm and body.
pub fn view(note: &Note) -> Vec<String> {
    let mut lines = vec![
        format!("Title: {}", note.title),
        match note.alarm {
            Some(at) => format!("Alarm: {}", format_alarm_input(at)),
            None => "Alarm: none".to_string(),
        },
        "---".to_string(),
    ];
    if note.content.is_empty() {
        lines.push("(empty)".to_string());
    } else {
        lines.extend(note.content.lines().map(str::to_string));
    }
    lines
}
