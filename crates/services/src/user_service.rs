use std::sync::Arc;

use drive_core::model::{Payment, PaymentRequest, UserDetails};
use reqwest::StatusCode;

use crate::api::{ApiClient, Auth};
use crate::error::{ApiError, UserServiceError};
use crate::session_manager::SessionManager;

/// Profile and payment operations for the signed-in user.
#[derive(Clone)]
pub struct UserService {
    api: ApiClient,
    session: Arc<SessionManager>,
}

impl UserService {
    #[must_use]
    pub fn new(api: ApiClient, session: Arc<SessionManager>) -> Self {
        Self { api, session }
    }

    async fn user_id(&self) -> Result<String, UserServiceError> {
        self.session
            .user_id()
            .await
            .ok_or(UserServiceError::NotAuthenticated)
    }

    /// # Errors
    /// Returns an error when nobody is signed in or the request fails.
    pub async fn user_details(&self) -> Result<UserDetails, UserServiceError> {
        let user_id = self.user_id().await?;
        Ok(self
            .api
            .get_json(&format!("/v1/users/{user_id}/details"), Auth::Bearer)
            .await?)
    }

    /// Payment history. The server answers 404 when the user has never
    /// paid, which is reported as [`UserServiceError::NoPayments`] rather
    /// than a request failure.
    ///
    /// # Errors
    /// Returns an error when nobody is signed in or the request fails.
    pub async fn payments(&self) -> Result<Vec<Payment>, UserServiceError> {
        let user_id = self.user_id().await?;
        match self
            .api
            .get_json(&format!("/v1/users/{user_id}/payments"), Auth::Bearer)
            .await
        {
            Ok(payments) => Ok(payments),
            Err(ApiError::Status(status)) if status == StatusCode::NOT_FOUND => {
                Err(UserServiceError::NoPayments)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Submits a payment. Failures propagate unchanged so the caller can
    /// show the decline to the user.
    ///
    /// # Errors
    /// Returns an error when nobody is signed in or the request fails.
    pub async fn make_payment(&self, request: &PaymentRequest) -> Result<Payment, UserServiceError> {
        let user_id = self.user_id().await?;
        Ok(self
            .api
            .post_json(&format!("/v1/users/pay/{user_id}"), request, Auth::Bearer)
            .await?)
    }
}
