//! MT4 webhook gateway library
//!
//! Turns trading alerts received over HTTP into authenticated calls against a
//! remote MT4 terminal service, for any number of configured accounts.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
