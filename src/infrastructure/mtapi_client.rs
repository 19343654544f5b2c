//! # MT4 Terminal API Client
//!
//! HTTP client for the hosted MT4 terminal service. Every operation is a
//! `POST {api_base}/{Operation}` carrying a JSON request body; every reply is
//! wrapped in the same envelope:
//!
//! ```json
//! { "result": <payload or null>, "error": { "code": "...", "message": "..." } }
//! ```
//!
//! A non-empty `error.message` means the call failed, whatever the HTTP status,
//! and a non-2xx status always fails the call. A 2xx body that is not an
//! envelope is a decode failure.
//! Each call is bounded by the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::domain::entities::account::Account;
use crate::domain::entities::position::PositionHandle;
use crate::domain::errors::{TerminalError, TerminalResult};
use crate::domain::repositories::trading_terminal::{OrderAck, OrderTicket, TradingTerminal};

/// Hosted MT4 terminal endpoint
pub const MTAPI_BASE: &str = "https://mt4grpc.mtapi.io";

#[derive(Debug, Clone)]
pub struct MtApiConfig {
    pub api_base: Url,
    /// Port sent in `Connect`, the broker server port
    pub server_port: u16,
    pub timeout: Duration,
}

impl Default for MtApiConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(MTAPI_BASE).expect("MTAPI_BASE is a valid URL"),
            server_port: 443,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
struct ConnectRequest<'a> {
    user: &'a str,
    password: &'a str,
    host: &'a str,
    port: u16,
}

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderSendRequest<'a> {
    id: &'a str,
    symbol: &'a str,
    operation: u8,
    volume: f64,
    price: f64,
    slippage: u32,
    stoploss: f64,
    takeprofit: f64,
    placed_type: u8,
}

#[derive(Debug, Serialize)]
struct OrderCloseRequest<'a> {
    id: &'a str,
    ticket: i64,
    lots: f64,
    price: f64,
    slippage: u32,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

impl RpcErrorBody {
    fn failure_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct RpcReply<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

impl<T> RpcReply<T> {
    /// Fail on a non-empty error message, otherwise hand back the payload.
    fn into_result(self, operation: &'static str) -> TerminalResult<Option<T>> {
        match self.error.as_ref().and_then(RpcErrorBody::failure_message) {
            Some(message) => {
                let code = self.error.as_ref().and_then(|e| e.code.as_ref());
                debug!(operation, code = ?code, "terminal reported an error");
                Err(TerminalError::Remote {
                    operation,
                    message: message.to_string(),
                })
            }
            None => Ok(self.result),
        }
    }
}

/// Decode a reply body into the `{result, error}` envelope.
///
/// The body must be a JSON object carrying at least one of the two keys;
/// anything else is not a terminal reply.
fn decode_envelope<T: DeserializeOwned>(
    operation: &'static str,
    body: &[u8],
) -> TerminalResult<RpcReply<T>> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| TerminalError::Decode(format!("{}: {}", operation, e)))?;

    let is_envelope = value
        .as_object()
        .map(|fields| fields.contains_key("result") || fields.contains_key("error"))
        .unwrap_or(false);
    if !is_envelope {
        return Err(TerminalError::Decode(format!(
            "{}: reply is not a result/error envelope",
            operation
        )));
    }

    serde_json::from_value(value).map_err(|e| TerminalError::Decode(format!("{}: {}", operation, e)))
}

#[derive(Debug, Deserialize)]
struct OpenedOrder {
    ticket: i64,
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct SentOrder {
    #[serde(default)]
    ticket: Option<i64>,
}

pub struct MtApiClient {
    client: Client,
    config: MtApiConfig,
}

impl MtApiClient {
    pub fn new(config: MtApiConfig) -> TerminalResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("mtgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TerminalError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, operation: &str) -> String {
        format!(
            "{}/{}",
            self.config.api_base.as_str().trim_end_matches('/'),
            operation
        )
    }

    async fn call<Req, T>(&self, operation: &'static str, request: &Req) -> TerminalResult<Option<T>>
    where
        Req: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let after_ms = self.config.timeout.as_millis() as u64;
        match tokio::time::timeout(self.config.timeout, self.send(operation, request)).await {
            Ok(result) => result,
            Err(_) => Err(TerminalError::Timeout { operation, after_ms }),
        }
    }

    async fn send<Req, T>(&self, operation: &'static str, request: &Req) -> TerminalResult<Option<T>>
    where
        Req: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let response = self
            .client
            .post(self.endpoint(operation))
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        let reply = decode_envelope::<T>(operation, &body);
        if status.is_success() {
            return reply?.into_result(operation);
        }

        // A failed HTTP status is never a success, whatever the body holds
        match reply {
            Ok(reply) => match reply.error.as_ref().and_then(RpcErrorBody::failure_message) {
                Some(message) => Err(TerminalError::Remote {
                    operation,
                    message: message.to_string(),
                }),
                None => Err(TerminalError::Transport(format!(
                    "{} returned HTTP {}",
                    operation, status
                ))),
            },
            Err(_) => Err(TerminalError::Transport(format!(
                "{} returned HTTP {}",
                operation, status
            ))),
        }
    }

    fn transport_error(&self, operation: &'static str, error: reqwest::Error) -> TerminalError {
        if error.is_timeout() {
            TerminalError::Timeout {
                operation,
                after_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            TerminalError::Transport(format!("{}: {}", operation, error))
        }
    }
}

#[async_trait]
impl TradingTerminal for MtApiClient {
    fn name(&self) -> &str {
        "mtapi"
    }

    async fn connect(&self, account: &Account) -> TerminalResult<String> {
        let request = ConnectRequest {
            user: &account.login,
            password: account.password.as_str(),
            host: &account.host,
            port: self.config.server_port,
        };

        let token: Option<String> = self.call("Connect", &request).await?;
        match token {
            Some(token) if !token.is_empty() => {
                info!(account = %account.id, host = %account.host, "terminal session opened");
                Ok(token)
            }
            _ => Err(TerminalError::Decode("Connect returned no token".to_string())),
        }
    }

    async fn list_open_positions(&self, token: &str) -> TerminalResult<Vec<PositionHandle>> {
        let orders: Option<Vec<OpenedOrder>> =
            self.call("OpenedOrders", &SessionRequest { id: token }).await?;

        Ok(orders
            .unwrap_or_default()
            .into_iter()
            .map(|order| PositionHandle {
                ticket: order.ticket,
                symbol: order.symbol,
            })
            .collect())
    }

    async fn submit_order(&self, token: &str, order: &OrderTicket) -> TerminalResult<OrderAck> {
        let request = OrderSendRequest {
            id: token,
            symbol: &order.symbol,
            operation: order.side.operation(),
            volume: order.volume.value(),
            price: 0.0,
            slippage: 0,
            stoploss: 0.0,
            takeprofit: 0.0,
            placed_type: 0,
        };

        let sent: Option<SentOrder> = self.call("OrderSend", &request).await?;
        Ok(OrderAck {
            ticket: sent.and_then(|s| s.ticket),
        })
    }

    async fn close_position(&self, token: &str, ticket: i64) -> TerminalResult<()> {
        let request = OrderCloseRequest {
            id: token,
            ticket,
            lots: 0.0,
            price: 0.0,
            slippage: 0,
        };

        let _: Option<Value> = self.call("OrderClose", &request).await?;
        Ok(())
    }
}
