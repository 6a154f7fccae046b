pub mod alarms;
pub mod notes;

pub use alarms::AlarmStore;
pub use notes::NoteStore;
