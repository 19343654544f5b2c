//! Webhook Gateway
//!
//! Runs one inbound alert batch through the pipeline:
//!
//! ```text
//! AccountResolved -> SessionValid -> IntentsInterpreted -> IntentsDispatched -> ResponseReady
//! ```
//!
//! Anything failing before the first remote side effect (account lookup,
//! session, batch decoding) aborts the request. From dispatch onwards every
//! intent carries its own `Result`; failures are logged and the batch moves on.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::entities::account::AccountId;
use crate::domain::entities::alert::MalformedAlert;
use crate::domain::entities::order::OrderIntent;
use crate::domain::errors::{GatewayError, IntentError};
use crate::domain::repositories::account_registry::AccountRegistry;
use crate::domain::repositories::trading_terminal::{OrderAck, OrderTicket, TradingTerminal};
use crate::domain::services::intent_interpreter::{self, InterpretedAlert};
use crate::domain::services::position_closer::{CloseReport, PositionCloser};
use crate::domain::services::session_manager::SessionManager;

/// What a successfully executed intent produced.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentSuccess {
    Opened(OrderAck),
    Closed(CloseReport),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntentOutcome {
    pub index: usize,
    pub intent: OrderIntent,
    pub result: Result<IntentSuccess, IntentError>,
}

/// Per-entry results of one webhook call, in batch order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub account: AccountId,
    pub dispatched: Vec<IntentOutcome>,
    pub skipped: Vec<MalformedAlert>,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> usize {
        self.dispatched.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.dispatched.len() - self.succeeded()
    }
}

pub struct WebhookGateway {
    registry: Arc<AccountRegistry>,
    sessions: SessionManager,
    terminal: Arc<dyn TradingTerminal>,
    closer: PositionCloser,
}

impl WebhookGateway {
    pub fn new(
        registry: Arc<AccountRegistry>,
        terminal: Arc<dyn TradingTerminal>,
        sessions: SessionManager,
    ) -> Self {
        Self {
            registry,
            closer: PositionCloser::new(terminal.clone()),
            terminal,
            sessions,
        }
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Process one webhook body for `account_id`.
    pub async fn handle(
        &self,
        account_id: &AccountId,
        body: &[u8],
    ) -> Result<BatchOutcome, GatewayError> {
        if !self.registry.contains(account_id) {
            warn!(account = %account_id, "webhook for unknown account rejected");
            return Err(GatewayError::InvalidAccount(account_id.clone()));
        }

        let token = self.sessions.get_valid_token(account_id).await?;

        let batch = intent_interpreter::parse_batch(body).map_err(|e| {
            error!(account = %account_id, "webhook error: {}", e);
            e
        })?;
        info!(
            account = %account_id,
            entries = batch.len(),
            "webhook received data: {}",
            String::from_utf8_lossy(body)
        );

        let mut outcome = BatchOutcome {
            account: account_id.clone(),
            dispatched: Vec::with_capacity(batch.len()),
            skipped: Vec::new(),
        };

        for interpretation in intent_interpreter::interpret(&batch) {
            match interpretation {
                Ok(alert) => {
                    let result = self.dispatch(account_id, &token, &alert).await;
                    outcome.dispatched.push(IntentOutcome {
                        index: alert.index,
                        intent: alert.intent,
                        result,
                    });
                }
                Err(malformed) => {
                    warn!(
                        account = %account_id,
                        index = malformed.index,
                        alert = %malformed.raw,
                        "skipping malformed alert: {}",
                        malformed.reason
                    );
                    outcome.skipped.push(malformed);
                }
            }
        }

        info!(
            account = %account_id,
            succeeded = outcome.succeeded(),
            failed = outcome.failed(),
            skipped = outcome.skipped.len(),
            "orders processed"
        );
        Ok(outcome)
    }

    async fn dispatch(
        &self,
        account_id: &AccountId,
        token: &str,
        alert: &InterpretedAlert,
    ) -> Result<IntentSuccess, IntentError> {
        match &alert.intent {
            OrderIntent::CloseAllForSymbol { symbol } => {
                match self.closer.close_all(token, symbol).await {
                    Ok(report) => {
                        info!(
                            account = %account_id,
                            symbol = %symbol,
                            matched = report.matched,
                            closed = report.closed,
                            "close-all finished"
                        );
                        Ok(IntentSuccess::Closed(report))
                    }
                    Err(e) => {
                        error!(
                            account = %account_id,
                            symbol = %symbol,
                            transport = e.is_transport(),
                            "close-all aborted, could not list positions: {}",
                            e
                        );
                        Err(IntentError::Enumeration(e))
                    }
                }
            }
            OrderIntent::OpenPosition {
                symbol,
                volume,
                direction,
            } => {
                let ticket = OrderTicket {
                    symbol: symbol.clone(),
                    side: *direction,
                    volume: *volume,
                };
                match self.terminal.submit_order(token, &ticket).await {
                    Ok(ack) => {
                        info!(
                            account = %account_id,
                            intent = %alert.intent,
                            ticket = ?ack.ticket,
                            "trading response ok"
                        );
                        Ok(IntentSuccess::Opened(ack))
                    }
                    Err(e) => {
                        error!(
                            account = %account_id,
                            intent = %alert.intent,
                            transport = e.is_transport(),
                            "order error: {}",
                            e
                        );
                        Err(IntentError::Submit(e))
                    }
                }
            }
        }
    }
}
