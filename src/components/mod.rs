pub mod alarm_banner;
pub mod note_row;
