//! Loads the account registry from the JSON file maintained by the
//! administration tool:
//!
//! ```json
//! { "12345": { "user": 700100, "pass": "secret", "host": "broker.example.com" } }
//! ```

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::entities::account::{Account, AccountId};
use crate::domain::repositories::account_registry::AccountRegistry;

#[derive(Debug, thiserror::Error)]
pub enum AccountStoreError {
    #[error("failed to read accounts file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid accounts file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("account {0} has an empty {1}")]
    EmptyField(String, &'static str),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Login {
    Number(u64),
    Text(String),
}

impl Login {
    fn into_string(self) -> String {
        match self {
            Login::Number(n) => n.to_string(),
            Login::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(Deserialize)]
struct AccountEntry {
    user: Login,
    pass: String,
    host: String,
}

pub struct AccountStore;

impl AccountStore {
    /// Read the registry from `path`. A missing file yields an empty registry.
    pub fn load(path: impl AsRef<Path>) -> Result<AccountRegistry, AccountStoreError> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "accounts file {} not found, every webhook will be rejected",
                    path.display()
                );
                return Ok(AccountRegistry::default());
            }
            Err(source) => {
                return Err(AccountStoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let registry = Self::parse(&raw)?;
        info!(
            "loaded {} account(s) from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn parse(raw: &str) -> Result<AccountRegistry, AccountStoreError> {
        let entries: HashMap<String, AccountEntry> = serde_json::from_str(raw)?;

        let mut accounts = Vec::with_capacity(entries.len());
        for (id, entry) in entries {
            let id = AccountId::new(id);
            let login = entry.user.into_string();
            if login.is_empty() {
                return Err(AccountStoreError::EmptyField(id.to_string(), "user"));
            }
            if entry.host.trim().is_empty() {
                return Err(AccountStoreError::EmptyField(id.to_string(), "host"));
            }
            accounts.push(Account {
                id,
                login,
                password: Zeroizing::new(entry.pass),
                host: entry.host.trim().to_string(),
            });
        }

        Ok(AccountRegistry::new(accounts))
    }
}
