use chime::core::note::Note;
use uuid::Uuid;

use crate::components::note_row::note_row;

/// The note list, in the order given.
pub fn view(notes: &[&Note], active: Option<Uuid>) -> Vec<String> {
    notes.iter().map(|note| note_row(note, active)).collect()
}
