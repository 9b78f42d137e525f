//! Wire-level data model for the driving-school REST API and the local
//! key-value records derived from it.
//!
//! Everything here serializes with camelCase field names to match the
//! server's JSON shape.

mod course;
mod rule;
mod schedule;
mod settings;
mod ticket;
mod user;

pub use course::{Course, CourseElement, CourseGroup};
pub use rule::{RuleChapter, RuleChapterDetails, RuleItem};
pub use schedule::{Attendance, NewSchedule, ScheduleEntry};
pub use settings::{AppSettings, ThemePreference};
pub use ticket::{Answer, ExamResult, ImageRef, Question, TicketSummary, UserAnswer};
pub use user::{
    CategoryStatus, Group, LicenseCategory, Payment, PaymentMethod, PaymentRequest, PaymentStatus,
    UserDetails, UserRef,
};
