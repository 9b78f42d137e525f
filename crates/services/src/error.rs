use drive_core::exam::ExamError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use thiserror::Error;

/// Errors raised while talking to the backend over HTTP.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("no access token available")]
    MissingToken,
    #[error("request failed with status {0}")]
    Status(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid base url: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// The HTTP status of a non-success response, if that is what failed.
    #[must_use]
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Status(status) => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TicketServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamLoopError {
    #[error(transparent)]
    Exam(#[from] ExamError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<TicketServiceError> for ExamLoopError {
    fn from(err: TicketServiceError) -> Self {
        match err {
            TicketServiceError::Api(e) => Self::Api(e),
            TicketServiceError::Storage(e) => Self::Storage(e),
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuleServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScheduleServiceError {
    #[error("no authenticated user")]
    NotAuthenticated,
    #[error("user id {0:?} is not a numeric instructor id")]
    InvalidUserId(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UserServiceError {
    #[error("no authenticated user")]
    NotAuthenticated,
    #[error("no payments recorded for this user")]
    NoPayments,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseServiceError {
    #[error("no authenticated user")]
    NotAuthenticated,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
