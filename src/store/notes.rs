use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::note::Note;

/// Notes in creation order. Display order is derived on demand by [`NoteStore::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteStore {
    notes: Vec<Note>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_notes(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    pub fn as_slice(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn create(&mut self, title: &str, now: DateTime<Utc>) -> Note {
        let note = Note::new(title, now);
        self.notes.push(note.clone());
        note
    }

    /// Replace whichever fields are given and bump `updated_at`.
    /// Returns false when no note has this id.
    pub fn update(
        &mut self,
        id: Uuid,
        title: Option<String>,
        content: Option<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(note) = self.get_mut(id) else {
            return false;
        };
        if let Some(title) = title {
            note.title = title;
        }
        if let Some(content) = content {
            note.content = content;
        }
        note.updated_at = now;
        true
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Note> {
        let idx = self.notes.iter().position(|n| n.id == id)?;
        Some(self.notes.remove(idx))
    }

    /// Newest first by `updated_at`; equal timestamps keep store order.
    pub fn list(&self) -> Vec<&Note> {
        let mut sorted: Vec<&Note> = self.notes.iter().collect();
        sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sorted
    }

    pub fn get(&self, id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn first(&self) -> Option<&Note> {
        self.notes.first()
    }

    pub fn most_recent(&self) -> Option<&Note> {
        self.list().into_iter().next()
    }

    /// Notes whose id starts with `prefix`, in store order.
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<&Note> {
        let prefix = prefix.to_ascii_lowercase();
        self.notes
            .iter()
            .filter(|n| n.id.to_string().starts_with(&prefix))
            .collect()
    }

    /// Set the alarm mirror without touching `updated_at`.
    pub fn set_alarm_mirror(&mut self, id: Uuid, alarm: Option<DateTime<Utc>>) -> bool {
        match self.get_mut(id) {
            Some(note) => {
                note.alarm = alarm;
                true
            }
            None => false,
        }
    }
}
