//! Closes every open position of one symbol, tolerating per-position failures.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::errors::{TerminalError, TerminalResult};
use crate::domain::repositories::trading_terminal::TradingTerminal;

/// Outcome of a close-all run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CloseReport {
    /// Positions that matched the symbol
    pub matched: usize,
    /// Positions whose close call reported no error
    pub closed: usize,
    /// Tickets whose close call failed, with the reason
    pub failed: Vec<(i64, TerminalError)>,
}

pub struct PositionCloser {
    terminal: Arc<dyn TradingTerminal>,
}

impl PositionCloser {
    pub fn new(terminal: Arc<dyn TradingTerminal>) -> Self {
        Self { terminal }
    }

    /// Enumerate open positions once, then close each one matching `symbol` exactly.
    ///
    /// Only a failure of the enumeration itself is returned as an error.
    pub async fn close_all(&self, token: &str, symbol: &str) -> TerminalResult<CloseReport> {
        let positions = self.terminal.list_open_positions(token).await?;

        let mut report = CloseReport::default();
        for position in positions.iter().filter(|p| p.is_for(symbol)) {
            report.matched += 1;
            match self.terminal.close_position(token, position.ticket).await {
                Ok(()) => {
                    info!(symbol, ticket = position.ticket, "position closed");
                    report.closed += 1;
                }
                Err(e) => {
                    error!(
                        symbol,
                        ticket = position.ticket,
                        transport = e.is_transport(),
                        "failed to close position: {}",
                        e
                    );
                    report.failed.push((position.ticket, e));
                }
            }
        }

        Ok(report)
    }
}
