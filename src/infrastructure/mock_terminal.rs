//! In-memory terminal used for dry runs and tests.
//!
//! Every call is recorded; replies are scripted through the builder methods.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::entities::account::Account;
use crate::domain::entities::position::PositionHandle;
use crate::domain::errors::{TerminalError, TerminalResult};
use crate::domain::repositories::trading_terminal::{OrderAck, OrderTicket, TradingTerminal};

/// A call observed by the mock, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalCall {
    Connect { login: String },
    ListOpenPositions { token: String },
    SubmitOrder { token: String, order: OrderTicket },
    ClosePosition { token: String, ticket: i64 },
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<TerminalCall>,
    positions: Vec<PositionHandle>,
    connect_failure: Option<TerminalError>,
    list_failure: Option<TerminalError>,
    close_failures: HashMap<i64, TerminalError>,
    submit_failures: HashMap<String, TerminalError>,
    next_ticket: i64,
}

#[derive(Debug)]
pub struct MockTradingTerminal {
    state: Mutex<MockState>,
    connect_delay: Duration,
    sessions_issued: AtomicU64,
}

impl Default for MockTradingTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTradingTerminal {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_ticket: 1,
                ..MockState::default()
            }),
            connect_delay: Duration::ZERO,
            sessions_issued: AtomicU64::new(0),
        }
    }

    pub fn with_positions(mut self, positions: Vec<PositionHandle>) -> Self {
        self.state.get_mut().positions = positions;
        self
    }

    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    pub fn rejecting_connect(mut self, message: &str) -> Self {
        self.state.get_mut().connect_failure = Some(TerminalError::Remote {
            operation: "Connect",
            message: message.to_string(),
        });
        self
    }

    pub fn failing_list(mut self, error: TerminalError) -> Self {
        self.state.get_mut().list_failure = Some(error);
        self
    }

    pub fn failing_close(mut self, ticket: i64, error: TerminalError) -> Self {
        self.state.get_mut().close_failures.insert(ticket, error);
        self
    }

    pub fn rejecting_symbol(mut self, symbol: &str, message: &str) -> Self {
        self.state.get_mut().submit_failures.insert(
            symbol.to_string(),
            TerminalError::Remote {
                operation: "OrderSend",
                message: message.to_string(),
            },
        );
        self
    }

    /// Change the outcome of later `connect` calls.
    pub async fn set_connect_failure(&self, failure: Option<TerminalError>) {
        self.state.lock().await.connect_failure = failure;
    }

    pub async fn calls(&self) -> Vec<TerminalCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn connect_count(&self) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|call| matches!(call, TerminalCall::Connect { .. }))
            .count()
    }

    pub async fn open_positions(&self) -> Vec<PositionHandle> {
        self.state.lock().await.positions.clone()
    }
}

#[async_trait]
impl TradingTerminal for MockTradingTerminal {
    fn name(&self) -> &str {
        "mock"
    }

    async fn connect(&self, account: &Account) -> TerminalResult<String> {
        self.state.lock().await.calls.push(TerminalCall::Connect {
            login: account.login.clone(),
        });

        if !self.connect_delay.is_zero() {
            tokio::time::sleep(self.connect_delay).await;
        }

        if let Some(error) = self.state.lock().await.connect_failure.clone() {
            return Err(error);
        }

        let n = self.sessions_issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("mock terminal issued session #{} for {}", n, account.login);
        Ok(format!("session-{}-{}", account.login, n))
    }

    async fn list_open_positions(&self, token: &str) -> TerminalResult<Vec<PositionHandle>> {
        let mut state = self.state.lock().await;
        state.calls.push(TerminalCall::ListOpenPositions {
            token: token.to_string(),
        });
        match &state.list_failure {
            Some(error) => Err(error.clone()),
            None => Ok(state.positions.clone()),
        }
    }

    async fn submit_order(&self, token: &str, order: &OrderTicket) -> TerminalResult<OrderAck> {
        let mut state = self.state.lock().await;
        state.calls.push(TerminalCall::SubmitOrder {
            token: token.to_string(),
            order: order.clone(),
        });
        if let Some(error) = state.submit_failures.get(&order.symbol) {
            return Err(error.clone());
        }

        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state
            .positions
            .push(PositionHandle::new(ticket, &order.symbol));
        Ok(OrderAck {
            ticket: Some(ticket),
        })
    }

    async fn close_position(&self, token: &str, ticket: i64) -> TerminalResult<()> {
        let mut state = self.state.lock().await;
        state.calls.push(TerminalCall::ClosePosition {
            token: token.to_string(),
            ticket,
        });
        if let Some(error) = state.close_failures.get(&ticket) {
            return Err(error.clone());
        }
        state.positions.retain(|position| position.ticket != ticket);
        Ok(())
    }
}
