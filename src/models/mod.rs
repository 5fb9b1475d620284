pub mod course;

pub use course::{Category, CourseDocument, CourseRecord, RecordGroup, ScheduleSlot};
