pub mod course;
pub mod session;

pub use course::TreatmentCourseService;
pub use session::SessionSchedulingService;
