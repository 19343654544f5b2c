//! Trading Terminal Trait
//!
//! This module defines the `TradingTerminal` trait, the boundary to the remote
//! MT4 terminal service. The gateway only ever talks to the terminal through
//! this trait, so the HTTP client and the in-memory mock are interchangeable.
//!
//! Every call is expected to be bounded in time by the implementation; a timed
//! out call surfaces as [`TerminalError::Timeout`](crate::domain::errors::TerminalError::Timeout).

use async_trait::async_trait;

use crate::domain::entities::account::Account;
use crate::domain::entities::order::OrderSide;
use crate::domain::entities::position::PositionHandle;
use crate::domain::errors::TerminalResult;
use crate::domain::value_objects::lot::Lot;

/// Market order as sent to the terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTicket {
    pub symbol: String,
    pub side: OrderSide,
    pub volume: Lot,
}

/// Acknowledgement of an accepted order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderAck {
    /// Ticket assigned by the terminal, when it reports one
    pub ticket: Option<i64>,
}

#[async_trait]
pub trait TradingTerminal: Send + Sync {
    /// Get the name of this terminal backend
    fn name(&self) -> &str;

    /// Open a session for `account` and return the session token
    async fn connect(&self, account: &Account) -> TerminalResult<String>;

    /// List every open position of the session's account
    async fn list_open_positions(&self, token: &str) -> TerminalResult<Vec<PositionHandle>>;

    /// Submit a market order
    async fn submit_order(&self, token: &str, order: &OrderTicket) -> TerminalResult<OrderAck>;

    /// Close one position by ticket
    async fn close_position(&self, token: &str, ticket: i64) -> TerminalResult<()>;
}
