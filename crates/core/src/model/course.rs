use serde::{Deserialize, Serialize};

/// Course content element; visibility is toggled per element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseElement {
    pub id: i64,
    pub name: String,
    pub visible: bool,
}

/// Course payload from `/v1/courses/user/{userId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub elements: Vec<CourseElement>,
}

/// Group entry from `/v1/courses/groups/{courseId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseGroup {
    pub id: i64,
    pub group_name: String,
}
