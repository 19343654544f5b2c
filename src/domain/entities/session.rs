use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Default lifetime of a terminal session token.
pub const SESSION_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// A token issued by the terminal for one account.
#[derive(Clone)]
pub struct Session {
    token: String,
    issued_at: Instant,
    issued_at_utc: DateTime<Utc>,
}

impl Session {
    pub fn new(token: String, issued_at: Instant) -> Self {
        Self {
            token,
            issued_at,
            issued_at_utc: Utc::now(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn issued_at_utc(&self) -> DateTime<Utc> {
        self.issued_at_utc
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.issued_at)
    }

    /// A session is usable strictly before it reaches `ttl`.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) < ttl
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<REDACTED>")
            .field("issued_at", &self.issued_at_utc)
            .finish()
    }
}
