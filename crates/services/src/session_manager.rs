use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;

use drive_core::claims::{Identity, TokenClaims};
use drive_core::time::Clock;
use serde::{Deserialize, Serialize};
use storage::repository::TokenRepository;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{ApiClient, Auth};
use crate::connectivity::ConnectivityProbe;

pub const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(30);

const HEALTH_PATH: &str = "/v1/health";
const LOGIN_PATH: &str = "/v1/auth/login";
const REFRESH_PATH: &str = "/v1/auth/token";

/// Last observed backend state. `Unknown` until the first probe answers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ServerHealth {
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

#[derive(Clone, Debug, Default)]
struct SessionState {
    connected: bool,
    server_health: ServerHealth,
    identity: Option<Identity>,
    /// Epoch second at which the access token should be refreshed.
    refresh_at: Option<i64>,
    loading: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Owns the auth session: token persistence, identity, silent refresh and
/// the periodic server health probe. Login and refresh report success as a
/// bool; every failure path already degrades the session (logs, clears
/// tokens, forces logout) so callers only branch on the outcome.
pub struct SessionManager {
    api: ApiClient,
    tokens: Arc<dyn TokenRepository>,
    clock: Clock,
    state: RwLock<SessionState>,
    /// Serializes concurrent refresh attempts. Losers recheck freshness
    /// after the winner finishes instead of firing a second request.
    refresh_gate: Mutex<()>,
    refresh_task: StdMutex<Option<JoinHandle<()>>>,
    health_task: StdMutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    #[must_use]
    pub fn new(api: ApiClient, tokens: Arc<dyn TokenRepository>, clock: Clock) -> Arc<Self> {
        Arc::new(Self {
            api,
            tokens,
            clock,
            state: RwLock::new(SessionState::default()),
            refresh_gate: Mutex::new(()),
            refresh_task: StdMutex::new(None),
            health_task: StdMutex::new(None),
        })
    }

    // ─── observers ───

    pub async fn is_connected(&self) -> bool {
        self.state.read().await.connected
    }

    pub async fn server_health(&self) -> ServerHealth {
        self.state.read().await.server_health
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.identity.clone()
    }

    pub async fn user_id(&self) -> Option<String> {
        self.state
            .read()
            .await
            .identity
            .as_ref()
            .map(|identity| identity.user_id.clone())
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// True while an identity is loaded and its token has not crossed the
    /// refresh deadline.
    pub async fn is_authenticated(&self) -> bool {
        let state = self.state.read().await;
        state.identity.is_some()
            && state
                .refresh_at
                .is_some_and(|at| at > self.clock.now_epoch())
    }

    // ─── lifecycle ───

    /// Restores the session on startup: probes connectivity, runs an
    /// initial health check and reloads any persisted tokens.
    pub async fn initialize(self: &Arc<Self>, probe: &dyn ConnectivityProbe) {
        self.state.write().await.loading = true;

        let connected = probe.is_connected().await;
        {
            let mut state = self.state.write().await;
            state.connected = connected;
            if !connected {
                state.server_health = ServerHealth::Unhealthy;
            }
        }
        if connected {
            self.check_server_health().await;
        }

        self.load_auth_state().await;
        self.state.write().await.loading = false;
    }

    /// Records a connectivity change from the platform.
    pub async fn set_connected(&self, connected: bool) {
        let mut state = self.state.write().await;
        state.connected = connected;
        if !connected {
            state.server_health = ServerHealth::Unhealthy;
        }
    }

    /// Hits the unauthenticated health endpoint and records the verdict.
    pub async fn check_server_health(&self) {
        let health = match self.api.get_ok(HEALTH_PATH, Auth::Skip).await {
            Ok(()) => ServerHealth::Healthy,
            Err(err) => {
                debug!(error = %err, "health check failed");
                ServerHealth::Unhealthy
            }
        };
        self.state.write().await.server_health = health;
    }

    /// Probes health every [`HEALTH_CHECK_INTERVAL`] until shutdown. Skips
    /// the request while the device reports no connectivity.
    pub fn spawn_health_loop(self: &Arc<Self>) {
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(HEALTH_CHECK_INTERVAL);
            // the immediate first tick duplicates the initialize() probe
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if manager.is_connected().await {
                    manager.check_server_health().await;
                } else {
                    manager.state.write().await.server_health = ServerHealth::Unhealthy;
                }
            }
        });
        if let Some(old) = lock_slot(&self.health_task).replace(handle) {
            old.abort();
        }
    }

    /// Stops the background refresh and health tasks.
    pub fn shutdown(&self) {
        if let Some(task) = lock_slot(&self.refresh_task).take() {
            task.abort();
        }
        if let Some(task) = lock_slot(&self.health_task).take() {
            task.abort();
        }
    }

    // ─── auth ───

    /// Validates credentials locally, then exchanges them for a token pair.
    /// Returns false on any failure; the session is left logged out.
    pub async fn login(self: &Arc<Self>, email: &str, password: &str) -> bool {
        if !is_valid_email(email) || password.is_empty() {
            debug!("login rejected before request, invalid credentials format");
            return false;
        }

        let request = LoginRequest { email, password };
        let response: LoginResponse =
            match self.api.post_json(LOGIN_PATH, &request, Auth::Skip).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(error = %err, "login request failed");
                    return false;
                }
            };

        if let Err(err) = self
            .tokens
            .save_tokens(&response.access_token, &response.refresh_token)
            .await
        {
            warn!(error = %err, "failed to persist token pair");
            return false;
        }

        match TokenClaims::decode(&response.access_token) {
            Ok(claims) => {
                self.apply_claims(&claims).await;
                self.arm_refresh();
                debug!(user_id = %claims.sub, "login succeeded");
                true
            }
            Err(err) => {
                warn!(error = %err, "login returned an undecodable access token");
                self.clear_tokens().await;
                self.clear_session().await;
                false
            }
        }
    }

    /// Drops tokens and identity. Background health checks keep running.
    pub async fn logout(&self) {
        debug!("logging out");
        self.clear_tokens().await;
        self.clear_session().await;
        if let Some(task) = lock_slot(&self.refresh_task).take() {
            task.abort();
        }
    }

    /// Exchanges the refresh token for a new access token. Any failure
    /// forces a logout so the session never keeps a dead token pair.
    pub async fn refresh_tokens(&self) -> bool {
        let _gate = self.refresh_gate.lock().await;

        // another caller may have finished the refresh while we waited
        if self
            .state
            .read()
            .await
            .refresh_at
            .is_some_and(|at| at > self.clock.now_epoch())
        {
            return true;
        }

        let refresh_token = match self.tokens.refresh_token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                warn!("refresh requested without a stored refresh token");
                return false;
            }
            Err(err) => {
                warn!(error = %err, "failed to read refresh token");
                return false;
            }
        };

        let request = RefreshRequest {
            refresh_token: &refresh_token,
        };
        let response: Result<RefreshResponse, _> =
            self.api.post_json(REFRESH_PATH, &request, Auth::Skip).await;
        let access_token = match response {
            Ok(RefreshResponse {
                access_token: Some(token),
            }) => token,
            Ok(RefreshResponse { access_token: None }) => {
                warn!("refresh response carried no access token, logging out");
                self.logout().await;
                return false;
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, logging out");
                self.logout().await;
                return false;
            }
        };

        if let Err(err) = self.tokens.save_access_token(&access_token).await {
            warn!(error = %err, "failed to persist refreshed access token");
            self.logout().await;
            return false;
        }
        match TokenClaims::decode(&access_token) {
            Ok(claims) => {
                self.apply_claims(&claims).await;
                debug!(refresh_at = claims.refresh_at(), "access token refreshed");
                true
            }
            Err(err) => {
                warn!(error = %err, "refreshed access token is undecodable, logging out");
                self.logout().await;
                false
            }
        }
    }

    /// Reloads identity from the persisted access token. A stale token is
    /// refreshed silently; an unreadable one clears the session without
    /// surfacing an error.
    async fn load_auth_state(self: &Arc<Self>) {
        let token = match self.tokens.access_token().await {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "failed to read persisted access token");
                None
            }
        };
        let Some(token) = token else {
            self.clear_session().await;
            return;
        };

        let claims = match TokenClaims::decode(&token) {
            Ok(claims) => claims,
            Err(err) => {
                warn!(error = %err, "persisted access token is undecodable, clearing");
                self.clear_tokens().await;
                self.clear_session().await;
                return;
            }
        };

        if claims.is_stale(self.clock.now_epoch()) {
            debug!("persisted access token is stale, refreshing");
            if self.refresh_tokens().await {
                self.arm_refresh();
            } else {
                self.clear_session().await;
            }
        } else {
            self.apply_claims(&claims).await;
            self.arm_refresh();
        }
    }

    async fn apply_claims(&self, claims: &TokenClaims) {
        let mut state = self.state.write().await;
        state.identity = Some(claims.identity());
        state.refresh_at = Some(claims.refresh_at());
    }

    async fn clear_session(&self) {
        let mut state = self.state.write().await;
        state.identity = None;
        state.refresh_at = None;
    }

    async fn clear_tokens(&self) {
        if let Err(err) = self.tokens.clear_tokens().await {
            warn!(error = %err, "failed to clear persisted tokens");
        }
    }

    /// Starts the silent refresh task. The task sleeps until the current
    /// refresh deadline, refreshes, and repeats with the new deadline; it
    /// ends when the deadline has already passed, the session is logged
    /// out, or a refresh fails.
    fn arm_refresh(self: &Arc<Self>) {
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            loop {
                let Some(refresh_at) = manager.state.read().await.refresh_at else {
                    break;
                };
                let delay = refresh_at - manager.clock.now_epoch();
                if delay <= 0 {
                    // a deadline already in the past arms no timer; the
                    // token stays until the next explicit check refreshes it
                    break;
                }
                tokio::time::sleep(Duration::from_secs(delay.unsigned_abs())).await;
                debug!("access token near expiry, refreshing");
                if !manager.refresh_tokens().await {
                    break;
                }
            }
        });
        if let Some(old) = lock_slot(&self.refresh_task).replace(handle) {
            old.abort();
        }
    }
}

fn lock_slot(slot: &StdMutex<Option<JoinHandle<()>>>) -> MutexGuard<'_, Option<JoinHandle<()>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mirrors the login form check: one `@`, no whitespace, and a dotted
/// domain with text on both sides of the last dot.
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            if local.is_empty() || local.chars().any(char::is_whitespace) {
                return false;
            }
            if domain.chars().any(char::is_whitespace) {
                return false;
            }
            match domain.rsplit_once('.') {
                Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
                None => false,
            }
        }
        _ => false,
    }
}
