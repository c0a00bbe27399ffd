use std::collections::HashMap;

use crate::domain::account::Account;

/// Accounts keyed by email.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AccountBook {
    accounts: HashMap<String, Account>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or wholesale replace the record under its email.
    pub fn upsert(&mut self, account: Account) {
        self.accounts.insert(account.email.clone(), account);
    }

    pub fn find(&self, email: &str) -> Option<&Account> {
        self.accounts.get(email)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Account> {
        self.accounts.values().find(|a| a.id == id)
    }

    pub fn remove(&mut self, email: &str) -> Option<Account> {
        self.accounts.remove(email)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub(crate) fn as_map(&self) -> &HashMap<String, Account> {
        &self.accounts
    }
}

impl From<HashMap<String, Account>> for AccountBook {
    fn from(accounts: HashMap<String, Account>) -> Self {
        Self { accounts }
    }
}
