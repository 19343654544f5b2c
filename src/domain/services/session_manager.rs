//! Session Manager
//!
//! Owns one cached terminal session per account and renews it lazily once it
//! has reached its time to live.
//!
//! ## Concurrency
//! Each account has its own slot guarded by an async mutex that is held for
//! the whole check-and-renew sequence. Concurrent callers for one account
//! therefore queue behind an in-flight `connect` and then reuse its token,
//! while different accounts never contend with each other beyond the short
//! slot lookup.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::domain::entities::account::AccountId;
use crate::domain::entities::session::{Session, SESSION_TTL};
use crate::domain::errors::SessionError;
use crate::domain::repositories::account_registry::AccountRegistry;
use crate::domain::repositories::trading_terminal::TradingTerminal;

type SessionSlot = Arc<Mutex<Option<Session>>>;

pub struct SessionManager {
    registry: Arc<AccountRegistry>,
    terminal: Arc<dyn TradingTerminal>,
    ttl: Duration,
    slots: Mutex<HashMap<AccountId, SessionSlot>>,
}

impl SessionManager {
    pub fn new(registry: Arc<AccountRegistry>, terminal: Arc<dyn TradingTerminal>) -> Self {
        Self::with_ttl(registry, terminal, SESSION_TTL)
    }

    pub fn with_ttl(
        registry: Arc<AccountRegistry>,
        terminal: Arc<dyn TradingTerminal>,
        ttl: Duration,
    ) -> Self {
        Self {
            registry,
            terminal,
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return a token that is younger than the TTL, opening a new session when needed.
    ///
    /// A failed renewal leaves whatever was cached untouched; an expired
    /// session is never handed out.
    pub async fn get_valid_token(&self, account_id: &AccountId) -> Result<String, SessionError> {
        let account = self
            .registry
            .get(account_id)
            .ok_or_else(|| SessionError::InvalidAccount(account_id.clone()))?;

        let slot = self.slot(account_id).await;
        let mut cached = slot.lock().await;

        let reason = match cached.as_ref() {
            Some(session) if session.is_fresh(Instant::now(), self.ttl) => {
                debug!(account = %account_id, "reusing cached session");
                return Ok(session.token().to_string());
            }
            Some(_) => "expired",
            None => "absent",
        };

        info!(account = %account_id, reason, "establishing terminal session");

        match self.terminal.connect(account).await {
            Ok(token) => {
                let session = Session::new(token, Instant::now());
                let token = session.token().to_string();
                info!(
                    account = %account_id,
                    issued_at = %session.issued_at_utc(),
                    "token refreshed"
                );
                *cached = Some(session);
                Ok(token)
            }
            Err(e) => {
                error!(account = %account_id, "terminal connection error: {}", e);
                Err(SessionError::from_terminal(account_id, e))
            }
        }
    }

    /// Number of accounts holding a session or currently establishing one.
    pub async fn cached_sessions(&self) -> usize {
        let slots = self.slots.lock().await;
        slots
            .values()
            .filter(|slot| match slot.try_lock() {
                Ok(session) => session.is_some(),
                Err(_) => true,
            })
            .count()
    }

    async fn slot(&self, account_id: &AccountId) -> SessionSlot {
        let mut slots = self.slots.lock().await;
        slots
            .entry(account_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }
}
