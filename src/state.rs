use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::alarm::Alarm;
use crate::core::clock::Clock;
use crate::core::note::{DEFAULT_TITLE, Note};
use crate::error::AlarmError;
use crate::storage::{ALARMS_KEY, KeyValueStore, NOTES_KEY, load_collection, save_collection};
use crate::store::{AlarmStore, NoteStore};

/// Everything the running application knows: both stores, the active-note
/// cursor, and the storage and clock they are bound to.
///
/// Every mutation goes through this type so the alarm store and the notes'
/// alarm mirrors change together and are written out before returning.
pub struct AppState<S, C> {
    storage: S,
    clock: C,
    notes: NoteStore,
    alarms: AlarmStore,
    active: Option<Uuid>,
    default_title: String,
}

impl<S: KeyValueStore, C: Clock> AppState<S, C> {
    /// Load both collections, repair anything inconsistent between them,
    /// and make sure there is a note to edit.
    pub fn load(storage: S, clock: C) -> Self {
        Self::load_with_title(storage, clock, DEFAULT_TITLE)
    }

    pub fn load_with_title(storage: S, clock: C, default_title: impl Into<String>) -> Self {
        let notes = NoteStore::from_notes(load_collection(&storage, NOTES_KEY));
        let alarms = AlarmStore::from_alarms(load_collection(&storage, ALARMS_KEY));
        log::info!("Loaded {} notes and {} alarms", notes.len(), alarms.len());

        let mut state = Self {
            storage,
            clock,
            notes,
            alarms,
            active: None,
            default_title: default_title.into(),
        };
        state.reconcile();

        match state.notes.first().map(|n| n.id) {
            Some(id) => state.active = Some(id),
            None => {
                state.create_note();
            }
        }
        state
    }

    /// Bring persisted data back in line with the one-alarm-per-note rule
    /// and the alarm mirror on each note.
    fn reconcile(&mut self) {
        let mut alarms_changed = false;
        let mut notes_changed = false;

        let before = self.alarms.len();
        let notes = &self.notes;
        self.alarms.retain(|a| notes.contains(a.note_id));
        if self.alarms.len() != before {
            log::warn!("Dropped {} alarms for missing notes", before - self.alarms.len());
            alarms_changed = true;
        }

        // Keep the last alarm recorded for each note.
        let mut seen = HashSet::new();
        let mut keep: Vec<Alarm> = self
            .alarms
            .as_slice()
            .iter()
            .rev()
            .filter(|a| seen.insert(a.note_id))
            .cloned()
            .collect();
        keep.reverse();
        if keep.len() != self.alarms.len() {
            log::warn!(
                "Dropped {} duplicate alarms",
                self.alarms.len() - keep.len()
            );
            self.alarms = AlarmStore::from_alarms(keep);
            alarms_changed = true;
        }

        let mirrors: Vec<(Uuid, Option<DateTime<Utc>>)> = self
            .notes
            .as_slice()
            .iter()
            .filter_map(|n| {
                let mirrored = self.alarms.get(n.id).map(|a| a.trigger_time);
                (n.alarm != mirrored).then_some((n.id, mirrored))
            })
            .collect();
        for (id, alarm) in mirrors {
            log::warn!("Repaired alarm mirror on note {}", id);
            self.notes.set_alarm_mirror(id, alarm);
            notes_changed = true;
        }

        if alarms_changed {
            self.persist_alarms();
        }
        if notes_changed {
            self.persist_notes();
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn alarms(&self) -> &AlarmStore {
        &self.alarms
    }

    pub fn active_id(&self) -> Option<Uuid> {
        self.active
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.active.and_then(|id| self.notes.get(id))
    }

    /// Make `id` the note being edited. Unknown ids leave the cursor alone.
    pub fn activate(&mut self, id: Uuid) -> Option<&Note> {
        if !self.notes.contains(id) {
            return None;
        }
        self.active = Some(id);
        self.notes.get(id)
    }

    /// Create a blank note and make it active.
    pub fn create_note(&mut self) -> Note {
        let now = self.clock.now();
        let note = self.notes.create(&self.default_title, now);
        self.persist_notes();
        self.active = Some(note.id);
        log::info!("Created note {}", note.id);
        note
    }

    pub fn update_note(&mut self, id: Uuid, title: Option<String>, content: Option<String>) {
        let now = self.clock.now();
        if self.notes.update(id, title, content, now) {
            self.persist_notes();
        } else {
            log::debug!("Ignoring update for unknown note {}", id);
        }
    }

    /// Delete a note and its alarm. The store is never left empty, and the
    /// active cursor never points at a deleted note.
    pub fn delete_note(&mut self, id: Uuid) {
        if self.notes.remove(id).is_none() {
            log::debug!("Ignoring delete for unknown note {}", id);
            return;
        }
        log::info!("Deleted note {}", id);

        if self.alarms.clear(id).is_some() {
            self.persist_alarms();
        }
        self.persist_notes();

        if self.notes.is_empty() {
            self.create_note();
        } else if self.active == Some(id) {
            self.active = self.notes.most_recent().map(|n| n.id);
        }
    }

    /// Newest first.
    pub fn list_notes(&self) -> Vec<&Note> {
        self.notes.list()
    }

    pub fn get_note(&self, id: Uuid) -> Option<&Note> {
        self.notes.get(id)
    }

    /// Schedule the alarm for `note_id`, replacing any earlier one, and mirror
    /// it onto the note. Rejected without changes if the note is unknown or
    /// `trigger_time` is not in the future.
    pub fn set_alarm(
        &mut self,
        note_id: Uuid,
        trigger_time: DateTime<Utc>,
        note_title: &str,
    ) -> Result<Alarm, AlarmError> {
        if !self.notes.contains(note_id) {
            return Err(AlarmError::NoteNotFound(note_id));
        }
        let now = self.clock.now();
        let alarm = self
            .alarms
            .set(note_id, trigger_time, note_title, now)?
            .clone();
        self.persist_alarms();

        self.notes.set_alarm_mirror(note_id, Some(trigger_time));
        self.persist_notes();

        log::info!("Alarm for note {} set at {}", note_id, trigger_time);
        Ok(alarm)
    }

    /// Drop the pending alarm for `note_id`, if any.
    pub fn clear_alarm(&mut self, note_id: Uuid) -> Option<Alarm> {
        let removed = self.alarms.clear(note_id)?;
        self.persist_alarms();

        if self.notes.set_alarm_mirror(note_id, None) {
            self.persist_notes();
        }
        log::debug!("Cleared alarm for note {}", note_id);
        Some(removed)
    }

    pub fn due_alarms(&self, now: DateTime<Utc>) -> Vec<&Alarm> {
        self.alarms.due(now)
    }

    pub fn persist_notes(&mut self) {
        save_collection(&mut self.storage, NOTES_KEY, self.notes.as_slice());
    }

    pub fn persist_alarms(&mut self) {
        save_collection(&mut self.storage, ALARMS_KEY, self.alarms.as_slice());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::scheduler::{Notifier, Scheduler};
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn fresh() -> AppState<MemoryStore, ManualClock> {
        AppState::load(MemoryStore::new(), ManualClock::new(t0()))
    }

    fn assert_mirror_consistent<S: KeyValueStore, C: Clock>(state: &AppState<S, C>) {
        for note in state.notes().as_slice() {
            let alarm = state.alarms().get(note.id);
            assert_eq!(note.alarm, alarm.map(|a| a.trigger_time), "note {}", note.id);
        }
        for alarm in state.alarms().as_slice() {
            assert!(state.notes().contains(alarm.note_id));
        }
    }

    #[test]
    fn empty_storage_starts_with_one_active_blank_note() {
        let state = fresh();
        assert_eq!(state.notes().len(), 1);
        let note = state.active_note().unwrap();
        assert_eq!(note.title, "Untitled Note");
        assert!(note.content.is_empty());
        assert!(state.storage().get(NOTES_KEY).is_some());
    }

    #[test]
    fn custom_default_title() {
        let state = AppState::load_with_title(MemoryStore::new(), ManualClock::new(t0()), "New");
        assert_eq!(state.active_note().unwrap().title, "New");
    }

    #[test]
    fn create_activates_and_persists() {
        let mut state = fresh();
        let note = state.create_note();
        assert_eq!(state.active_id(), Some(note.id));
        let saved: Vec<Note> = load_collection(state.storage(), NOTES_KEY);
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1].id, note.id);
    }

    #[test]
    fn update_bumps_timestamp_and_persists() {
        let mut state = fresh();
        let id = state.active_id().unwrap();
        state.clock().advance(Duration::seconds(30));
        state.update_note(id, Some("Plans".into()), Some("<i>soon</i>".into()));

        let note = state.get_note(id).unwrap();
        assert_eq!(note.title, "Plans");
        assert_eq!(note.content, "<i>soon</i>");
        assert_eq!(note.updated_at, t0() + Duration::seconds(30));
        assert_eq!(note.created_at, t0());

        let saved: Vec<Note> = load_collection(state.storage(), NOTES_KEY);
        assert_eq!(saved[0].title, "Plans");
    }

    #[test]
    fn update_unknown_is_silent() {
        let mut state = fresh();
        let before = state.notes().clone();
        state.update_note(Uuid::new_v4(), Some("x".into()), None);
        assert_eq!(state.notes(), &before);
    }

    #[test]
    fn delete_only_note_creates_active_blank() {
        let mut state = fresh();
        let only = state.active_id().unwrap();
        state.delete_note(only);

        assert_eq!(state.notes().len(), 1);
        let replacement = state.active_note().unwrap();
        assert_ne!(replacement.id, only);
        assert_eq!(replacement.title, "Untitled Note");
    }

    #[test]
    fn delete_active_activates_most_recent() {
        let mut state = fresh();
        let a = state.active_id().unwrap();
        state.clock().advance(Duration::seconds(1));
        let b = state.create_note().id;
        state.clock().advance(Duration::seconds(1));
        let c = state.create_note().id;
        state.clock().advance(Duration::seconds(1));
        state.update_note(a, Some("touched".into()), None);

        state.activate(c);
        state.delete_note(c);
        assert_eq!(state.active_id(), Some(a));
        assert!(state.get_note(b).is_some());
    }

    #[test]
    fn delete_inactive_keeps_cursor() {
        let mut state = fresh();
        let a = state.active_id().unwrap();
        let b = state.create_note().id;
        state.delete_note(a);
        assert_eq!(state.active_id(), Some(b));
        assert_eq!(state.notes().len(), 1);
    }

    #[test]
    fn delete_cascades_to_alarm() {
        let mut state = fresh();
        let a = state.active_id().unwrap();
        state.create_note();
        state.set_alarm(a, t0() + Duration::hours(1), "a").unwrap();
        state.delete_note(a);
        assert!(state.alarms().is_empty());
        let saved: Vec<Alarm> = load_collection(state.storage(), ALARMS_KEY);
        assert!(saved.is_empty());
        assert_mirror_consistent(&state);
    }

    #[test]
    fn activate_unknown_is_noop() {
        let mut state = fresh();
        let before = state.active_id();
        assert!(state.activate(Uuid::new_v4()).is_none());
        assert_eq!(state.active_id(), before);
    }

    #[test]
    fn set_alarm_mirrors_onto_note() {
        let mut state = fresh();
        let id = state.active_id().unwrap();
        let at = t0() + Duration::minutes(10);
        let alarm = state.set_alarm(id, at, "Untitled Note").unwrap();

        assert_eq!(alarm.trigger_time, at);
        assert_eq!(state.get_note(id).unwrap().alarm, Some(at));
        // Setting an alarm is not an edit.
        assert_eq!(state.get_note(id).unwrap().updated_at, t0());
        assert_mirror_consistent(&state);

        let saved_notes: Vec<Note> = load_collection(state.storage(), NOTES_KEY);
        assert_eq!(saved_notes[0].alarm, Some(at));
        let saved_alarms: Vec<Alarm> = load_collection(state.storage(), ALARMS_KEY);
        assert_eq!(saved_alarms.len(), 1);
    }

    #[test]
    fn set_alarm_in_past_changes_nothing() {
        let mut state = fresh();
        let id = state.active_id().unwrap();
        let notes_before = state.notes().clone();
        let saved_before = state.storage().get(NOTES_KEY).map(str::to_string);

        let err = state.set_alarm(id, t0(), "x").unwrap_err();
        assert!(matches!(err, AlarmError::InvalidSchedule { .. }));
        let err = state.set_alarm(id, t0() - Duration::hours(1), "x").unwrap_err();
        assert!(matches!(err, AlarmError::InvalidSchedule { .. }));

        assert!(state.alarms().is_empty());
        assert_eq!(state.notes(), &notes_before);
        assert!(state.storage().get(ALARMS_KEY).is_none());
        assert_eq!(state.storage().get(NOTES_KEY).map(str::to_string), saved_before);
    }

    #[test]
    fn set_alarm_for_unknown_note_is_rejected() {
        let mut state = fresh();
        let missing = Uuid::new_v4();
        let err = state.set_alarm(missing, t0() + Duration::hours(1), "x").unwrap_err();
        assert!(matches!(err, AlarmError::NoteNotFound(id) if id == missing));
        assert!(state.alarms().is_empty());
    }

    #[test]
    fn set_alarm_twice_keeps_second() {
        let mut state = fresh();
        let id = state.active_id().unwrap();
        state.set_alarm(id, t0() + Duration::hours(1), "first").unwrap();
        state.set_alarm(id, t0() + Duration::hours(2), "second").unwrap();

        assert_eq!(state.alarms().len(), 1);
        let alarm = state.alarms().get(id).unwrap();
        assert_eq!(alarm.note_title, "second");
        assert_eq!(alarm.trigger_time, t0() + Duration::hours(2));
        assert_mirror_consistent(&state);
    }

    #[test]
    fn clear_alarm_updates_mirror() {
        let mut state = fresh();
        let id = state.active_id().unwrap();
        state.set_alarm(id, t0() + Duration::hours(1), "x").unwrap();
        assert!(state.clear_alarm(id).is_some());
        assert!(state.get_note(id).unwrap().alarm.is_none());
        assert!(state.clear_alarm(id).is_none());
        assert_mirror_consistent(&state);
    }

    #[test]
    fn title_snapshot_survives_rename() {
        let mut state = fresh();
        let id = state.active_id().unwrap();
        state.update_note(id, Some("Before".into()), None);
        state.set_alarm(id, t0() + Duration::hours(1), "Before").unwrap();
        state.update_note(id, Some("After".into()), None);
        assert_eq!(state.alarms().get(id).unwrap().note_title, "Before");
    }

    #[test]
    fn reload_round_trip() {
        let mut state = fresh();
        let a = state.active_id().unwrap();
        state.update_note(a, Some("A".into()), Some("<p>alpha</p>".into()));
        let b = state.create_note().id;
        state.set_alarm(b, t0() + Duration::minutes(5), "Untitled Note").unwrap();

        let notes = state.notes().clone();
        let alarms = state.alarms().clone();
        let storage = state.storage().clone();

        let reloaded = AppState::load(storage, ManualClock::new(t0()));
        assert_eq!(reloaded.notes(), &notes);
        assert_eq!(reloaded.alarms(), &alarms);
        assert_eq!(reloaded.active_id(), Some(a));
    }

    #[test]
    fn load_repairs_inconsistent_storage() {
        let kept = Note::new("kept", t0());
        let mut stale = Note::new("stale mirror", t0());
        stale.alarm = Some(t0() + Duration::hours(9));
        let orphan = Alarm::new(Uuid::new_v4(), t0() + Duration::hours(1), "gone");
        let old = Alarm::new(kept.id, t0() + Duration::hours(1), "old");
        let new = Alarm::new(kept.id, t0() + Duration::hours(2), "new");

        let mut storage = MemoryStore::new();
        save_collection(&mut storage, NOTES_KEY, &[kept.clone(), stale.clone()]);
        save_collection(&mut storage, ALARMS_KEY, &[orphan, old, new.clone()]);

        let state = AppState::load(storage, ManualClock::new(t0()));
        assert_eq!(state.alarms().as_slice(), &[new]);
        assert_eq!(state.get_note(kept.id).unwrap().alarm, Some(t0() + Duration::hours(2)));
        assert!(state.get_note(stale.id).unwrap().alarm.is_none());
        assert_mirror_consistent(&state);

        let saved: Vec<Alarm> = load_collection(state.storage(), ALARMS_KEY);
        assert_eq!(saved.len(), 1);
    }

    #[test]
    fn malformed_storage_starts_fresh() {
        let mut storage = MemoryStore::new();
        storage.save(NOTES_KEY, "]]]").unwrap();
        storage.save(ALARMS_KEY, "null").unwrap();
        let state = AppState::load(storage, ManualClock::new(t0()));
        assert_eq!(state.notes().len(), 1);
        assert!(state.alarms().is_empty());
    }

    #[derive(Default)]
    struct CountingNotifier {
        fired: usize,
    }

    impl Notifier for CountingNotifier {
        fn notify(&mut self, _message: &str) {
            self.fired += 1;
        }

        fn dismiss(&mut self) {}
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create,
        Delete(usize),
        DeleteActive,
        SetAlarm(usize, i64),
        ClearAlarm(usize),
        Edit(usize),
        Tick(i64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Create),
            (0usize..8).prop_map(Op::Delete),
            Just(Op::DeleteActive),
            (0usize..8, -30i64..120).prop_map(|(i, s)| Op::SetAlarm(i, s)),
            (0usize..8).prop_map(Op::ClearAlarm),
            (0usize..8).prop_map(Op::Edit),
            (0i64..60).prop_map(Op::Tick),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_for_any_sequence(ops in proptest::collection::vec(op(), 0..60)) {
            let mut state = fresh();
            let mut notifier = CountingNotifier::default();
            for op in ops {
                let pick = |state: &AppState<MemoryStore, ManualClock>, i: usize| {
                    let notes = state.notes().as_slice();
                    notes[i % notes.len()].id
                };
                match op {
                    Op::Create => {
                        state.create_note();
                    }
                    Op::Delete(i) => {
                        let id = pick(&state, i);
                        state.delete_note(id);
                        prop_assert!(!state.notes().is_empty());
                    }
                    Op::DeleteActive => {
                        let id = state.active_id().unwrap();
                        state.delete_note(id);
                        prop_assert!(!state.notes().is_empty());
                    }
                    Op::SetAlarm(i, secs) => {
                        let id = pick(&state, i);
                        let at = state.now() + Duration::seconds(secs);
                        let before = state.alarms().clone();
                        let result = state.set_alarm(id, at, "t");
                        if secs <= 0 {
                            prop_assert!(result.is_err());
                            prop_assert_eq!(state.alarms(), &before);
                        } else {
                            prop_assert!(result.is_ok());
                        }
                    }
                    Op::ClearAlarm(i) => {
                        let id = pick(&state, i);
                        state.clear_alarm(id);
                    }
                    Op::Edit(i) => {
                        let id = pick(&state, i);
                        state.update_note(id, None, Some("body".into()));
                    }
                    Op::Tick(secs) => {
                        state.clock().advance(Duration::seconds(secs));
                        let due = state.due_alarms(state.now()).len();
                        let pending = state.alarms().len();
                        let fired_before = notifier.fired;

                        let fired = Scheduler::default().tick(&mut state, &mut notifier);

                        // One alarm per tick, and only when something was due.
                        prop_assert_eq!(fired.is_some(), due > 0);
                        prop_assert_eq!(state.alarms().len(), pending - usize::from(due > 0));
                        prop_assert_eq!(notifier.fired - fired_before, usize::from(due > 0));
                        if let Some(fired) = fired {
                            prop_assert!(state.alarms().get(fired.note_id).is_none());
                            prop_assert!(state.get_note(fired.note_id).is_some_and(|n| n.alarm.is_none()));
                        }
                    }
                }

                let active = state.active_id();
                prop_assert!(active.is_some_and(|id| state.notes().contains(id)));
                let mut seen = HashSet::new();
                for alarm in state.alarms().as_slice() {
                    prop_assert!(seen.insert(alarm.note_id));
                }
                for note in state.notes().as_slice() {
                    let mirrored = state.alarms().get(note.id).map(|a| a.trigger_time);
                    prop_assert_eq!(note.alarm, mirrored);
                }
            }
        }
    }
}
