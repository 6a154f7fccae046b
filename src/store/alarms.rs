use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::alarm::Alarm;
use crate::error::AlarmError;

/// Pending alarms in insertion order, at most one per note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlarmStore {
    alarms: Vec<Alarm>,
}

impl AlarmStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_alarms(alarms: Vec<Alarm>) -> Self {
        Self { alarms }
    }

    pub fn as_slice(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    /// Schedule an alarm for `note_id`, replacing any earlier one.
    /// `trigger_time` must be strictly after `now`; otherwise nothing changes.
    pub fn set(
        &mut self,
        note_id: Uuid,
        trigger_time: DateTime<Utc>,
        note_title: &str,
        now: DateTime<Utc>,
    ) -> Result<&Alarm, AlarmError> {
        if trigger_time <= now {
            return Err(AlarmError::InvalidSchedule {
                trigger: trigger_time,
                now,
            });
        }
        self.alarms.retain(|a| a.note_id != note_id);
        self.alarms.push(Alarm::new(note_id, trigger_time, note_title));
        Ok(&self.alarms[self.alarms.len() - 1])
    }

    pub fn clear(&mut self, note_id: Uuid) -> Option<Alarm> {
        let idx = self.alarms.iter().position(|a| a.note_id == note_id)?;
        Some(self.alarms.remove(idx))
    }

    /// Every alarm with `trigger_time <= now`, in insertion order.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<&Alarm> {
        self.alarms.iter().filter(|a| a.is_due(now)).collect()
    }

    pub fn get(&self, note_id: Uuid) -> Option<&Alarm> {
        self.alarms.iter().find(|a| a.note_id == note_id)
    }

    /// Keep only alarms accepted by `keep`, preserving order.
    pub fn retain(&mut self, keep: impl FnMut(&Alarm) -> bool) {
        self.alarms.retain(keep);
    }
}
