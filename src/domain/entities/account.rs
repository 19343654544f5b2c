use std::fmt;

use zeroize::Zeroizing;

/// Registry key of a trading account, as used in the webhook path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    /// Accept only a positive integer path segment, normalised to its decimal form.
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment.parse::<u64>() {
            Ok(0) | Err(_) => None,
            Ok(n) => Some(Self(n.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Credentials needed to open a terminal session for one account.
#[derive(Clone)]
pub struct Account {
    pub id: AccountId,
    pub login: String,
    pub password: Zeroizing<String>,
    pub host: String,
}

impl Account {
    pub fn new(id: AccountId, login: &str, password: &str, host: &str) -> Self {
        Self {
            id,
            login: login.to_string(),
            password: Zeroizing::new(password.to_string()),
            host: host.to_string(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("password", &"<REDACTED>")
            .field("host", &self.host)
            .finish()
    }
}
