use crate::domain::value_objects::lot::Lot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Map an alert's `side` field. Only the exact string `"buy"` means buy;
    /// everything else falls through to sell.
    pub fn from_alert(side: &str) -> Self {
        if side == "buy" {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        }
    }

    /// Numeric operation code understood by the terminal.
    pub fn operation(&self) -> u8 {
        match self {
            OrderSide::Buy => 0,
            OrderSide::Sell => 1,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// A typed instruction derived from one alert entry.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderIntent {
    OpenPosition {
        symbol: String,
        volume: Lot,
        direction: OrderSide,
    },
    CloseAllForSymbol {
        symbol: String,
    },
}

impl OrderIntent {
    pub fn symbol(&self) -> &str {
        match self {
            OrderIntent::OpenPosition { symbol, .. } => symbol,
            OrderIntent::CloseAllForSymbol { symbol } => symbol,
        }
    }
}

impl std::fmt::Display for OrderIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderIntent::OpenPosition {
                symbol,
                volume,
                direction,
            } => write!(f, "open {} {} {}", direction, volume, symbol),
            OrderIntent::CloseAllForSymbol { symbol } => write!(f, "close all {}", symbol),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_mapping() {
        assert_eq!(OrderSide::from_alert("buy"), OrderSide::Buy);
        assert_eq!(OrderSide::from_alert("sell"), OrderSide::Sell);
        assert_eq!(OrderSide::from_alert("BUY"), OrderSide::Sell);
        assert_eq!(OrderSide::from_alert("long"), OrderSide::Sell);
    }

    #[test]
    fn test_operation_codes() {
        assert_eq!(OrderSide::Buy.operation(), 0);
        assert_eq!(OrderSide::Sell.operation(), 1);
    }

    #[test]
    fn test_intent_display() {
        let open = OrderIntent::OpenPosition {
            symbol: "EURUSD".to_string(),
            volume: Lot::parse("0.5").unwrap(),
            direction: OrderSide::Buy,
        };
        assert_eq!(open.to_string(), "open BUY 0.50 EURUSD");
        assert_eq!(open.symbol(), "EURUSD");

        let close = OrderIntent::CloseAllForSymbol {
            symbol: "XAUUSD".to_string(),
        };
        assert_eq!(close.to_string(), "close all XAUUSD");
    }
}
