//! Alert entries as received in a webhook batch.
//!
//! Parsing is a strict schema step: every raw JSON entry becomes either an
//! [`AlertRecord`] or a [`MalformedAlert`] before any business logic runs.

use serde_json::Value;

use crate::domain::entities::order::OrderSide;
use crate::domain::errors::AlertError;
use crate::domain::value_objects::lot::Lot;

/// Values of `exit` that request closing every open position on the symbol.
pub const CLOSE_ALL_SENTINELS: [&str; 2] = ["0", "true"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitMode {
    None,
    CloseOnly,
    /// Modelled but never produced: close-all entries do not reopen.
    CloseThenReopen,
}

impl ExitMode {
    fn from_field(value: Option<&Value>) -> Result<Self, AlertError> {
        match value {
            None | Some(Value::Null) => Ok(ExitMode::None),
            Some(Value::Bool(flag)) => Ok(if *flag {
                ExitMode::CloseOnly
            } else {
                ExitMode::None
            }),
            Some(Value::String(raw)) if CLOSE_ALL_SENTINELS.contains(&raw.as_str()) => {
                Ok(ExitMode::CloseOnly)
            }
            Some(Value::String(_)) => Ok(ExitMode::None),
            Some(_) => Err(AlertError::InvalidType {
                field: "exit",
                expected: "string",
            }),
        }
    }

    pub fn closes_positions(&self) -> bool {
        !matches!(self, ExitMode::None)
    }
}

/// One validated line item of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRecord {
    pub symbol: String,
    pub lot: Lot,
    pub side: OrderSide,
    pub exit: ExitMode,
}

impl AlertRecord {
    pub fn from_value(raw: &Value) -> Result<Self, AlertError> {
        let fields = raw.as_object().ok_or(AlertError::NotAnObject)?;

        let symbol = match fields.get("symbol") {
            None | Some(Value::Null) => return Err(AlertError::MissingField("symbol")),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(AlertError::InvalidType {
                    field: "symbol",
                    expected: "string",
                })
            }
        };
        if symbol.trim().is_empty() {
            return Err(AlertError::EmptySymbol);
        }

        let lot = match fields.get("lot") {
            None | Some(Value::Null) => return Err(AlertError::MissingField("lot")),
            Some(Value::Number(n)) => Lot::parse(&n.to_string())?,
            Some(Value::String(s)) => Lot::parse(s)?,
            Some(_) => {
                return Err(AlertError::InvalidType {
                    field: "lot",
                    expected: "number or numeric string",
                })
            }
        };

        let side = match fields.get("side") {
            None | Some(Value::Null) => return Err(AlertError::MissingField("side")),
            Some(Value::String(s)) => OrderSide::from_alert(s),
            Some(_) => {
                return Err(AlertError::InvalidType {
                    field: "side",
                    expected: "string",
                })
            }
        };

        let exit = ExitMode::from_field(fields.get("exit"))?;

        Ok(AlertRecord {
            symbol,
            lot,
            side,
            exit,
        })
    }
}

/// An entry that failed validation; it is skipped, the batch goes on.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedAlert {
    pub index: usize,
    pub raw: Value,
    pub reason: AlertError,
}
