/// An open position as reported by the terminal. Owned remotely; never mutated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionHandle {
    pub ticket: i64,
    pub symbol: String,
}

impl PositionHandle {
    pub fn new(ticket: i64, symbol: &str) -> Self {
        Self {
            ticket,
            symbol: symbol.to_string(),
        }
    }

    /// Exact, case-sensitive symbol match.
    pub fn is_for(&self, symbol: &str) -> bool {
        self.symbol == symbol
    }
}
