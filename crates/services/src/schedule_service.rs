use std::sync::Arc;

use drive_core::model::{Attendance, NewSchedule, ScheduleEntry, UserRef};

use crate::api::{ApiClient, Auth};
use crate::error::ScheduleServiceError;
use crate::session_manager::SessionManager;

/// Lesson schedules and attendance, scoped to the signed-in user.
#[derive(Clone)]
pub struct ScheduleService {
    api: ApiClient,
    session: Arc<SessionManager>,
}

impl ScheduleService {
    #[must_use]
    pub fn new(api: ApiClient, session: Arc<SessionManager>) -> Self {
        Self { api, session }
    }

    async fn user_id(&self) -> Result<String, ScheduleServiceError> {
        self.session
            .user_id()
            .await
            .ok_or(ScheduleServiceError::NotAuthenticated)
    }

    /// Lessons for one month, newest first as the server returns them.
    /// The month filter is sent as `MM.YYYY`.
    ///
    /// # Errors
    /// Returns an error when nobody is signed in or the request fails.
    pub async fn month_schedule(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<ScheduleEntry>, ScheduleServiceError> {
        let user_id = self.user_id().await?;
        Ok(self
            .api
            .get_json(
                &format!("/v1/schedules/user/{user_id}?month={month:02}.{year}"),
                Auth::Bearer,
            )
            .await?)
    }

    /// # Errors
    /// Returns an error when the request fails.
    pub async fn attendance(
        &self,
        schedule_id: i64,
    ) -> Result<Vec<Attendance>, ScheduleServiceError> {
        Ok(self
            .api
            .get_json(
                &format!("/v1/schedules/user/attendances/{schedule_id}"),
                Auth::Bearer,
            )
            .await?)
    }

    /// Marks the signed-in student present or absent for a lesson.
    ///
    /// # Errors
    /// Returns an error when the request fails; callers surface it so the
    /// toggle can be rolled back in the UI.
    pub async fn update_attendance(
        &self,
        schedule_id: i64,
        present: bool,
    ) -> Result<Attendance, ScheduleServiceError> {
        Ok(self
            .api
            .post_json(
                &format!("/v1/schedules/user/attendances/{schedule_id}?status={present}"),
                &serde_json::json!({}),
                Auth::Bearer,
            )
            .await?)
    }

    /// Creates a practice lesson with the signed-in instructor as its owner.
    ///
    /// # Errors
    /// Returns an error when nobody is signed in, the user id is not
    /// numeric, or the request fails.
    pub async fn create_practice(
        &self,
        date_time: String,
        student_ids: Vec<i64>,
    ) -> Result<ScheduleEntry, ScheduleServiceError> {
        let user_id = self.user_id().await?;
        let instructor_id: i64 = user_id
            .parse()
            .map_err(|_| ScheduleServiceError::InvalidUserId(user_id))?;
        let payload = NewSchedule::practice(date_time, student_ids, instructor_id);
        Ok(self
            .api
            .post_json("/v1/schedules", &payload, Auth::Bearer)
            .await?)
    }

    /// Students assigned to the signed-in instructor.
    ///
    /// # Errors
    /// Returns an error when nobody is signed in or the request fails.
    pub async fn instructor_students(&self) -> Result<Vec<UserRef>, ScheduleServiceError> {
        let user_id = self.user_id().await?;
        Ok(self
            .api
            .get_json(&format!("/v1/users/students/{user_id}"), Auth::Bearer)
            .await?)
    }
}
