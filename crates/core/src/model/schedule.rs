use serde::{Deserialize, Serialize};

/// Lesson entry from `/v1/schedules/user/{userId}`.
///
/// The server omits fields depending on the entry type, so everything is
/// optional; date-times stay raw strings and pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default, rename = "type")]
    pub lesson_type: Option<String>,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub student_id: Option<i64>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub instructor_id: Option<i64>,
    #[serde(default)]
    pub instructor_name: Option<String>,
    #[serde(default)]
    pub attendance: Option<Vec<Attendance>>,
}

/// Attendance mark for one student on one schedule entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: i64,
    pub schedule_id: i64,
    pub student_id: i64,
    pub instructor_id: i64,
    pub status: String,
}

/// Payload for creating a practice lesson (`POST /v1/schedules`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedule {
    pub date_time: String,
    pub student_id: Vec<i64>,
    pub instructor_id: i64,
    #[serde(rename = "type")]
    pub lesson_type: String,
}

impl NewSchedule {
    /// Practice lesson for the given instructor and students.
    #[must_use]
    pub fn practice(date_time: String, student_id: Vec<i64>, instructor_id: i64) -> Self {
        Self {
            date_time,
            student_id,
            instructor_id,
            lesson_type: "PRACTICE".to_string(),
        }
    }
}
