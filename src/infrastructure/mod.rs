pub mod account_store;
pub mod mock_terminal;
pub mod mtapi_client;
