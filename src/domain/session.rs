use crate::domain::account::Account;

/// The account signed in on this client, if any.
///
/// Owned by the caller and passed into every operation that acts on "my"
/// account; the ledger persists it alongside the account book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current: Option<Account>,
}

impl Session {
    pub fn new(current: Option<Account>) -> Self {
        Self { current }
    }

    pub fn current(&self) -> Option<&Account> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current.as_ref().is_some_and(Account::is_admin)
    }

    pub fn account_id(&self) -> Option<&str> {
        self.current.as_ref().map(|a| a.id.as_str())
    }

    pub(crate) fn replace(&mut self, account: Option<Account>) {
        self.current = account;
    }
}
