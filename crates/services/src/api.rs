use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use storage::repository::TokenRepository;
use url::Url;

use crate::error::ApiError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const BASE_URL_ENV: &str = "DRIVE_API_BASE_URL";
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api";

/// Where the backend lives. The base URL keeps its path segment, so
/// endpoints are appended rather than resolved against the origin.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// # Errors
    /// Returns an error when `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Url::parse(base_url)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Reads the base URL from `DRIVE_API_BASE_URL`, falling back to the
    /// local development default.
    ///
    /// # Errors
    /// Returns an error when the environment value is not an absolute URL.
    pub fn from_env() -> Result<Self, url::ParseError> {
        match std::env::var(BASE_URL_ENV) {
            Ok(value) => Self::new(&value),
            Err(_) => Self::new(DEFAULT_BASE_URL),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Whether a request carries the stored access token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Auth {
    Bearer,
    Skip,
}

/// Thin JSON client over the backend API. Bearer requests read the access
/// token from storage at send time, so a refreshed token is picked up
/// without rebuilding the client.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenRepository>,
}

impl ApiClient {
    /// # Errors
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenRepository>) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            tokens,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn authorize(&self, req: RequestBuilder, auth: Auth) -> Result<RequestBuilder, ApiError> {
        match auth {
            Auth::Skip => Ok(req),
            Auth::Bearer => {
                let token = self
                    .tokens
                    .access_token()
                    .await?
                    .ok_or(ApiError::MissingToken)?;
                Ok(req.bearer_auth(token))
            }
        }
    }

    /// # Errors
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let req = self.http.get(self.endpoint(path));
        let resp = self.authorize(req, auth).await?.send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }

    /// # Errors
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let req = self.http.post(self.endpoint(path)).json(body);
        let resp = self.authorize(req, auth).await?.send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }

    /// GET that only cares whether the server answered 2xx. Used for the
    /// health probe, where the body is irrelevant.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn get_ok(&self, path: &str, auth: Auth) -> Result<(), ApiError> {
        let req = self.http.get(self.endpoint(path));
        let resp = self.authorize(req, auth).await?.send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        Ok(())
    }
}
