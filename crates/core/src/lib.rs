#![forbid(unsafe_code)]

pub mod claims;
pub mod exam;
pub mod model;
pub mod progress;
pub mod time;

pub use claims::{ClaimsError, Identity, REFRESH_MARGIN_SECS, TokenClaims};
pub use exam::{AttemptState, ExamError, ExamMode, TicketAttempt};
pub use time::Clock;
