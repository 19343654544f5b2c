//! Turns a raw webhook body into a sequence of typed order intents.

use serde_json::Value;

use crate::domain::entities::alert::{AlertRecord, MalformedAlert};
use crate::domain::entities::order::OrderIntent;
use crate::domain::errors::GatewayError;

/// A validated alert together with the intent it maps to.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpretedAlert {
    pub index: usize,
    pub record: AlertRecord,
    pub intent: OrderIntent,
}

pub type Interpretation = Result<InterpretedAlert, MalformedAlert>;

/// Decode the request body into raw alert entries.
///
/// A lone JSON object is treated as a one-entry batch. Anything that is not
/// JSON, or neither an array nor an object, rejects the whole request.
pub fn parse_batch(body: &[u8]) -> Result<Vec<Value>, GatewayError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| GatewayError::MalformedRequest(e.to_string()))?;

    match value {
        Value::Array(entries) => Ok(entries),
        Value::Object(_) => Ok(vec![value]),
        other => Err(GatewayError::MalformedRequest(format!(
            "expected a JSON array of alerts, got {}",
            json_kind(&other)
        ))),
    }
}

/// Validate and classify every entry, preserving batch order.
pub fn interpret(batch: &[Value]) -> Vec<Interpretation> {
    batch
        .iter()
        .enumerate()
        .map(|(index, raw)| match AlertRecord::from_value(raw) {
            Ok(record) => {
                let intent = classify(&record);
                Ok(InterpretedAlert {
                    index,
                    record,
                    intent,
                })
            }
            Err(reason) => Err(MalformedAlert {
                index,
                raw: raw.clone(),
                reason,
            }),
        })
        .collect()
}

/// Close-all entries ignore lot and side; they never reopen.
pub fn classify(record: &AlertRecord) -> OrderIntent {
    if record.exit.closes_positions() {
        OrderIntent::CloseAllForSymbol {
            symbol: record.symbol.clone(),
        }
    } else {
        OrderIntent::OpenPosition {
            symbol: record.symbol.clone(),
            volume: record.lot,
            direction: record.side,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::order::OrderSide;
    use crate::domain::errors::AlertError;
    use crate::domain::value_objects::lot::Lot;
    use serde_json::json;

    #[test]
    fn test_open_position_with_rounded_lot() {
        let batch = parse_batch(br#"[{"symbol":"EURUSD","lot":"1.005","side":"buy"}]"#).unwrap();
        let result = interpret(&batch);

        assert_eq!(result.len(), 1);
        let alert = result[0].as_ref().unwrap();
        assert_eq!(
            alert.intent,
            OrderIntent::OpenPosition {
                symbol: "EURUSD".to_string(),
                volume: Lot::parse("1.00").unwrap(),
                direction: OrderSide::Buy,
            }
        );
    }

    #[test]
    fn test_exit_zero_becomes_close_all() {
        let batch = vec![json!({"symbol": "XAUUSD", "side": "sell", "lot": "0.1", "exit": "0"})];
        let result = interpret(&batch);

        assert_eq!(
            result[0].as_ref().unwrap().intent,
            OrderIntent::CloseAllForSymbol {
                symbol: "XAUUSD".to_string()
            }
        );
    }

    #[test]
    fn test_exit_true_becomes_close_all() {
        let batch = vec![json!({"symbol": "US30", "side": "buy", "lot": 2, "exit": "true"})];
        assert!(matches!(
            interpret(&batch)[0],
            Ok(InterpretedAlert {
                intent: OrderIntent::CloseAllForSymbol { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_entry_does_not_poison_batch() {
        let batch = vec![
            json!({"lot": "1", "side": "buy"}),
            json!({"symbol": "GBPJPY", "lot": "0.3", "side": "sell"}),
        ];
        let result = interpret(&batch);

        assert_eq!(result.len(), 2);
        let malformed = result[0].as_ref().unwrap_err();
        assert_eq!(malformed.index, 0);
        assert_eq!(malformed.reason, AlertError::MissingField("symbol"));
        assert_eq!(result[1].as_ref().unwrap().index, 1);
    }

    #[test]
    fn test_order_is_preserved() {
        let batch = vec![
            json!({"symbol": "A", "lot": "1", "side": "buy"}),
            json!({"symbol": "B", "lot": "1", "side": "buy", "exit": "0"}),
            json!({"symbol": "C", "lot": "1", "side": "sell"}),
        ];
        let symbols: Vec<String> = interpret(&batch)
            .into_iter()
            .map(|r| r.unwrap().intent.symbol().to_string())
            .collect();
        assert_eq!(symbols, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_parse_batch_rejects_invalid_json() {
        assert!(matches!(
            parse_batch(b"not json"),
            Err(GatewayError::MalformedRequest(_))
        ));
        assert!(matches!(
            parse_batch(b""),
            Err(GatewayError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_parse_batch_rejects_scalars() {
        let err = parse_batch(b"42").unwrap_err();
        assert_eq!(
            err,
            GatewayError::MalformedRequest("expected a JSON array of alerts, got a number".to_string())
        );
    }

    #[test]
    fn test_parse_batch_accepts_single_object() {
        let batch = parse_batch(br#"{"symbol":"EURUSD","lot":1,"side":"buy"}"#).unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let batch = parse_batch(b"[]").unwrap();
        assert!(interpret(&batch).is_empty());
    }
}
