use std::collections::HashMap;

use crate::domain::entities::account::{Account, AccountId};

/// Read-only view of the configured accounts, keyed by account identifier.
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: HashMap<AccountId, Account>,
}

impl AccountRegistry {
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.id.clone(), account))
                .collect(),
        }
    }

    pub fn get(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub fn contains(&self, id: &AccountId) -> bool {
        self.accounts.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = AccountRegistry::new(vec![
            Account::new(AccountId::new("1"), "5001", "pw1", "demo.broker:443"),
            Account::new(AccountId::new("2"), "5002", "pw2", "live.broker:443"),
        ]);

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&AccountId::new("1")));
        assert_eq!(registry.get(&AccountId::new("2")).unwrap().login, "5002");
        assert!(registry.get(&AccountId::new("3")).is_none());
    }

    #[test]
    fn test_empty_registry() {
        let registry = AccountRegistry::default();
        assert!(registry.is_empty());
        assert!(!registry.contains(&AccountId::new("1")));
    }
}
