//! Client-side access-token decoding.
//!
//! The app only needs the claims; signature verification is the server's
//! job, so the payload segment is base64-decoded and parsed as-is.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use thiserror::Error;

/// Safety margin subtracted from `exp` when scheduling a refresh.
pub const REFRESH_MARGIN_SECS: i64 = 30;

pub const ROLE_PRACTICAL_INSTRUCTOR: &str = "PRACTICAL_INSTRUCTOR";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClaimsError {
    #[error("token is not a three-segment JWT")]
    Malformed,
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("claims are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The `roles` claim arrives either as a bare string or as a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RolesClaim {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: String,
    exp: i64,
    #[serde(default)]
    roles: Option<RolesClaim>,
}

/// Claims consumed from the access token: subject, expiry, roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub sub: String,
    pub exp: i64,
    pub roles: Vec<String>,
}

impl TokenClaims {
    /// Decode the payload segment of a JWT without verifying its signature.
    ///
    /// # Errors
    ///
    /// Returns `ClaimsError` when the token does not have three segments or
    /// the payload is not base64-encoded JSON with `sub` and `exp`.
    pub fn decode(token: &str) -> Result<Self, ClaimsError> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_)) if segments.next().is_none() => payload,
            _ => return Err(ClaimsError::Malformed),
        };

        let bytes = URL_SAFE_NO_PAD.decode(payload)?;
        let raw: RawClaims = serde_json::from_slice(&bytes)?;

        let roles = match raw.roles {
            Some(RolesClaim::One(role)) => vec![role],
            Some(RolesClaim::Many(roles)) => roles,
            None => Vec::new(),
        };

        Ok(Self {
            sub: raw.sub,
            exp: raw.exp,
            roles,
        })
    }

    /// Epoch second at which a silent refresh should fire (`exp` minus the
    /// safety margin).
    #[must_use]
    pub fn refresh_at(&self) -> i64 {
        self.exp - REFRESH_MARGIN_SECS
    }

    /// A token is stale once its refresh point has passed; a stale token is
    /// refreshed rather than trusted.
    #[must_use]
    pub fn is_stale(&self, now_epoch: i64) -> bool {
        self.refresh_at() <= now_epoch
    }

    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.sub.clone(),
            roles: self.roles.clone(),
        }
    }
}

/// Decoded identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub roles: Vec<String>,
}

impl Identity {
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    #[must_use]
    pub fn is_practical_instructor(&self) -> bool {
        self.has_role(ROLE_PRACTICAL_INSTRUCTOR)
    }
}
