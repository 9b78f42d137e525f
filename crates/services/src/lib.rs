//! Application services for the driving-exam client: the auth session,
//! the exam loop and the per-domain API services, all wired over one
//! storage backend.

#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod connectivity;
pub mod course_service;
pub mod error;
pub mod exam_loop;
pub mod rule_service;
pub mod schedule_service;
pub mod session_manager;
pub mod settings_service;
pub mod ticket_service;
pub mod user_service;

pub use api::{ApiClient, ApiConfig, Auth, DEFAULT_TIMEOUT};
pub use app_services::AppServices;
pub use connectivity::{AssumeOnline, ConnectivityProbe};
pub use course_service::CourseService;
pub use error::{
    ApiError, AppServicesError, CourseServiceError, ExamLoopError, RuleServiceError,
    ScheduleServiceError, SettingsServiceError, TicketServiceError, UserServiceError,
};
pub use exam_loop::{AUTO_ADVANCE_DELAY, AttemptAnswerOutcome, ExamLoopService};
pub use rule_service::RuleService;
pub use schedule_service::ScheduleService;
pub use session_manager::{HEALTH_CHECK_INTERVAL, ServerHealth, SessionManager};
pub use settings_service::SettingsService;
pub use ticket_service::TicketService;
pub use user_service::UserService;
