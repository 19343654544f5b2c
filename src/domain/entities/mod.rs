pub mod account;
pub mod alert;
pub mod order;
pub mod position;
pub mod session;
