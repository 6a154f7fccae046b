pub mod alarm;
pub mod clock;
pub mod note;
