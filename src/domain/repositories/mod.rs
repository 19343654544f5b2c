pub mod account_registry;
pub mod trading_terminal;
