pub mod appointment;
pub mod course;
pub mod error;
pub mod event;
pub mod hours;
pub mod shift;
