//! Shared fixtures for the integration tests

use std::sync::Arc;
use std::time::Duration;

use mtgate::application::services::webhook_gateway::WebhookGateway;
use mtgate::domain::entities::account::{Account, AccountId};
use mtgate::domain::repositories::account_registry::AccountRegistry;
use mtgate::domain::services::session_manager::SessionManager;
use mtgate::infrastructure::mock_terminal::MockTradingTerminal;
use mtgate::infrastructure::mtapi_client::{MtApiClient, MtApiConfig};
use url::Url;
use wiremock::MockServer;

pub const ACCOUNT_ID: &str = "12345";

pub fn test_account() -> Account {
    Account::new(AccountId::new(ACCOUNT_ID), "700100", "secret", "demo.broker.com")
}

/// Gateway wired to an in-memory terminal holding one account
#[allow(dead_code)]
pub fn mock_gateway(terminal: Arc<MockTradingTerminal>) -> Arc<WebhookGateway> {
    let registry = Arc::new(AccountRegistry::new(vec![test_account()]));
    let sessions = SessionManager::new(registry.clone(), terminal.clone());
    Arc::new(WebhookGateway::new(registry, terminal, sessions))
}

/// Setup a mock HTTP server standing in for the terminal API
#[allow(dead_code)]
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

#[allow(dead_code)]
pub fn client_for(server: &MockServer, timeout: Duration) -> MtApiClient {
    MtApiClient::new(MtApiConfig {
        api_base: Url::parse(&server.uri()).expect("mock server uri"),
        server_port: 443,
        timeout,
    })
    .expect("client builds")
}
