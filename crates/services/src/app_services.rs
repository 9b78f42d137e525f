use std::sync::Arc;

use drive_core::time::Clock;
use storage::repository::Storage;

use crate::api::{ApiClient, ApiConfig};
use crate::course_service::CourseService;
use crate::error::AppServicesError;
use crate::exam_loop::ExamLoopService;
use crate::rule_service::RuleService;
use crate::schedule_service::ScheduleService;
use crate::session_manager::SessionManager;
use crate::settings_service::SettingsService;
use crate::ticket_service::TicketService;
use crate::user_service::UserService;

/// Wires every service onto one storage backend and one API client. Build
/// it once at startup and hand out the services from it.
pub struct AppServices {
    session: Arc<SessionManager>,
    tickets: TicketService,
    exam_loop: ExamLoopService,
    rules: RuleService,
    schedule: ScheduleService,
    users: UserService,
    courses: CourseService,
    settings: SettingsService,
}

impl AppServices {
    /// # Errors
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, storage: Storage, clock: Clock) -> Result<Self, AppServicesError> {
        let api = ApiClient::new(config, Arc::clone(&storage.tokens))?;
        let session = SessionManager::new(api.clone(), Arc::clone(&storage.tokens), clock);
        let tickets = TicketService::new(
            api.clone(),
            Arc::clone(&storage.answers),
            Arc::clone(&storage.exam_results),
        );
        let exam_loop = ExamLoopService::new(
            tickets.clone(),
            Arc::clone(&storage.answers),
            Arc::clone(&storage.exam_results),
            Arc::clone(&storage.settings),
            clock,
        );
        let rules = RuleService::new(api.clone(), Arc::clone(&storage.viewed_items));
        let schedule = ScheduleService::new(api.clone(), Arc::clone(&session));
        let users = UserService::new(api.clone(), Arc::clone(&session));
        let courses = CourseService::new(api, Arc::clone(&session));
        let settings = SettingsService::new(Arc::clone(&storage.settings));
        Ok(Self {
            session,
            tickets,
            exam_loop,
            rules,
            schedule,
            users,
            courses,
            settings,
        })
    }

    /// Services over an in-memory store, for tests and scratch runs.
    ///
    /// # Errors
    /// Returns an error when the HTTP client cannot be built.
    pub fn new_in_memory(config: &ApiConfig, clock: Clock) -> Result<Self, AppServicesError> {
        Self::new(config, Storage::in_memory(), clock)
    }

    /// Services over a SQLite store at `db_url`, migrated on open.
    ///
    /// # Errors
    /// Returns an error when the database cannot be opened or migrated, or
    /// the HTTP client cannot be built.
    pub async fn new_sqlite(
        config: &ApiConfig,
        db_url: &str,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::new(config, storage, clock)
    }

    #[must_use]
    pub fn session(&self) -> Arc<SessionManager> {
        Arc::clone(&self.session)
    }

    #[must_use]
    pub fn tickets(&self) -> &TicketService {
        &self.tickets
    }

    #[must_use]
    pub fn exam_loop(&self) -> &ExamLoopService {
        &self.exam_loop
    }

    #[must_use]
    pub fn rules(&self) -> &RuleService {
        &self.rules
    }

    #[must_use]
    pub fn schedule(&self) -> &ScheduleService {
        &self.schedule
    }

    #[must_use]
    pub fn users(&self) -> &UserService {
        &self.users
    }

    #[must_use]
    pub fn courses(&self) -> &CourseService {
        &self.courses
    }

    #[must_use]
    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }
}
