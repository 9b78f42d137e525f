use std::sync::Arc;

use drive_core::model::{Course, CourseGroup};

use crate::api::{ApiClient, Auth};
use crate::error::CourseServiceError;
use crate::session_manager::SessionManager;

/// Theory course content and element visibility.
#[derive(Clone)]
pub struct CourseService {
    api: ApiClient,
    session: Arc<SessionManager>,
}

impl CourseService {
    #[must_use]
    pub fn new(api: ApiClient, session: Arc<SessionManager>) -> Self {
        Self { api, session }
    }

    /// The course assigned to the signed-in user.
    ///
    /// # Errors
    /// Returns an error when nobody is signed in or the request fails.
    pub async fn user_course(&self) -> Result<Course, CourseServiceError> {
        let user_id = self
            .session
            .user_id()
            .await
            .ok_or(CourseServiceError::NotAuthenticated)?;
        Ok(self
            .api
            .get_json(&format!("/v1/courses/user/{user_id}"), Auth::Bearer)
            .await?)
    }

    /// Flips one element's visibility and returns the new state.
    ///
    /// # Errors
    /// Returns an error when the request fails.
    pub async fn toggle_element_visibility(
        &self,
        element_id: i64,
    ) -> Result<bool, CourseServiceError> {
        Ok(self
            .api
            .post_json(
                &format!("/v1/courses/element/visible/{element_id}"),
                &serde_json::json!({}),
                Auth::Bearer,
            )
            .await?)
    }

    /// # Errors
    /// Returns an error when the request fails.
    pub async fn course_groups(&self, course_id: i64) -> Result<Vec<CourseGroup>, CourseServiceError> {
        Ok(self
            .api
            .get_json(&format!("/v1/courses/groups/{course_id}"), Auth::Bearer)
            .await?)
    }
}
