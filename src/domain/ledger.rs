use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{
    common::{
        clock::{Clock, SystemClock},
        config::LedgerConfig,
        error::LedgerError,
    },
    domain::{
        account::Account, account_book::AccountBook, payment::PaymentRequest,
        payment_book::PaymentBook, session::Session,
    },
    store::{
        ACCOUNTS_KEY, API_KEY_OVERRIDE_KEY, KeyValueStore, MemoryStore, PAYMENTS_KEY, SESSION_KEY,
        schema::{self, BlobKind},
    },
};

/// In-process snapshot of the account book, payment book and API key, with
/// every change written through to the backing store before it becomes
/// visible.
pub struct Ledger {
    accounts: AccountBook,
    payments: PaymentBook,
    api_key_override: Option<String>,
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    config: LedgerConfig,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("accounts", &self.accounts.len())
            .field("payments", &self.payments.len())
            .field("api_key_set", &self.api_key_override.is_some())
            .finish()
    }
}

impl Ledger {
    /// Load all blobs from `store`. Unreadable blobs start empty.
    pub fn open(store: Box<dyn KeyValueStore>, config: LedgerConfig) -> Self {
        let accounts: HashMap<String, Account> =
            schema::load(store.as_ref(), ACCOUNTS_KEY, BlobKind::Accounts);
        let payments: Vec<PaymentRequest> =
            schema::load(store.as_ref(), PAYMENTS_KEY, BlobKind::Payments);
        let api_key_override = match store.get(API_KEY_OVERRIDE_KEY) {
            Ok(key) => key.filter(|k| !k.is_empty()),
            Err(e) => {
                warn!(error = %e, "failed to read api key override");
                None
            }
        };

        info!(
            accounts = accounts.len(),
            payments = payments.len(),
            "ledger loaded"
        );

        Self {
            accounts: accounts.into(),
            payments: payments.into(),
            api_key_override,
            store,
            clock: Box::new(SystemClock),
            config,
        }
    }

    pub fn in_memory(config: LedgerConfig) -> Self {
        Self::open(Box::new(MemoryStore::new()), config)
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    // ---- session ----

    /// Session persisted by the previous run, if any.
    pub fn restore_session(&self) -> Session {
        let current: Option<Account> =
            schema::load(self.store.as_ref(), SESSION_KEY, BlobKind::Session);
        Session::new(current)
    }

    /// Persist (or clear) the session snapshot and update `session` to match.
    pub fn set_current(
        &mut self,
        session: &mut Session,
        account: Option<Account>,
    ) -> Result<(), LedgerError> {
        match &account {
            Some(acc) => schema::save(self.store.as_mut(), SESSION_KEY, acc)?,
            None => self.store.remove(SESSION_KEY)?,
        }
        session.replace(account);
        Ok(())
    }

    // ---- account book ----

    pub fn accounts(&self) -> &AccountBook {
        &self.accounts
    }

    pub fn find_account(&self, email: &str) -> Option<&Account> {
        self.accounts.find(email)
    }

    pub fn find_account_by_id(&self, id: &str) -> Option<&Account> {
        self.accounts.find_by_id(id)
    }

    pub fn upsert_account(&mut self, account: Account) -> Result<(), LedgerError> {
        let mut next = self.accounts.clone();
        next.upsert(account);
        self.replace_accounts(next)
    }

    pub fn remove_account(&mut self, email: &str) -> Result<Option<Account>, LedgerError> {
        let mut next = self.accounts.clone();
        let removed = next.remove(email);
        if removed.is_some() {
            self.replace_accounts(next)?;
        }
        Ok(removed)
    }

    fn replace_accounts(&mut self, next: AccountBook) -> Result<(), LedgerError> {
        schema::save(self.store.as_mut(), ACCOUNTS_KEY, next.as_map())?;
        self.accounts = next;
        Ok(())
    }

    // ---- payment book ----

    pub fn payments(&self) -> &PaymentBook {
        &self.payments
    }

    pub(crate) fn replace_payments(&mut self, next: PaymentBook) -> Result<(), LedgerError> {
        schema::save(self.store.as_mut(), PAYMENTS_KEY, &next.as_slice())?;
        self.payments = next;
        Ok(())
    }

    /// Requests made by the signed-in account, newest first.
    pub fn payment_history(&self, session: &Session) -> Result<Vec<PaymentRequest>, LedgerError> {
        let id = session.account_id().ok_or(LedgerError::NotAuthenticated)?;
        Ok(self.payments.list_for_account(id))
    }

    // ---- api key ----

    pub fn api_key(&self) -> Option<&str> {
        self.api_key_override.as_deref()
    }

    pub(crate) fn replace_api_key(&mut self, key: Option<String>) -> Result<(), LedgerError> {
        match &key {
            Some(k) => self.store.set(API_KEY_OVERRIDE_KEY, k)?,
            None => self.store.remove(API_KEY_OVERRIDE_KEY)?,
        }
        self.api_key_override = key;
        Ok(())
    }

    // ---- "my account" helpers ----

    /// The freshest copy of the signed-in account.
    ///
    /// Standard accounts are read from the book, which an admin may have
    /// edited since the session snapshot was taken. The administrator only
    /// lives in the session.
    pub(crate) fn own_account(&self, session: &Session) -> Result<Account, LedgerError> {
        let current = session.current().ok_or(LedgerError::NotAuthenticated)?;
        if current.is_admin() {
            return Ok(current.clone());
        }
        self.accounts
            .find_by_id(&current.id)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(current.id.clone()))
    }

    /// Write a changed account to the book and, when it is the signed-in
    /// account, to the session in the same step.
    pub(crate) fn commit_account(
        &mut self,
        session: &mut Session,
        account: Account,
    ) -> Result<(), LedgerError> {
        if !account.is_admin() {
            self.upsert_account(account.clone())?;
        }
        if session.account_id() == Some(account.id.as_str()) {
            self.set_current(session, Some(account))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Tier;

    fn ana() -> Account {
        Account::standard("user_1".into(), "Ana".into(), "ana@x.com".into(), 40)
    }

    #[test]
    fn upsert_writes_through() {
        let mut ledger = Ledger::in_memory(LedgerConfig::default());
        ledger.upsert_account(ana()).unwrap();

        let raw = ledger.store().get(ACCOUNTS_KEY).unwrap().expect("blob written");
        assert!(raw.contains("ana@x.com"));
        assert_eq!(ledger.find_account_by_id("user_1").unwrap().credits, 40);
    }

    #[test]
    fn corrupt_blobs_start_empty() {
        let store = MemoryStore::new()
            .with_blob(ACCOUNTS_KEY, "][")
            .with_blob(PAYMENTS_KEY, "{\"version\":2,\"data\":7}");
        let ledger = Ledger::open(Box::new(store), LedgerConfig::default());

        assert!(ledger.accounts().is_empty());
        assert!(ledger.payments().is_empty());
    }

    #[test]
    fn legacy_session_is_migrated_on_restore() {
        let store = MemoryStore::new().with_blob(
            SESSION_KEY,
            r#"{"id":"user_1","name":"Ana","email":"ana@x.com","credits":40,"role":"user"}"#,
        );
        let ledger = Ledger::open(Box::new(store), LedgerConfig::default());

        let session = ledger.restore_session();
        assert_eq!(session.current().unwrap().tier, Tier::Free);
    }

    #[test]
    fn set_current_none_clears_blob() {
        let mut ledger = Ledger::in_memory(LedgerConfig::default());
        let mut session = Session::default();

        ledger.set_current(&mut session, Some(ana())).unwrap();
        assert!(ledger.store().get(SESSION_KEY).unwrap().is_some());
        assert_eq!(ledger.restore_session(), session);

        ledger.set_current(&mut session, None).unwrap();
        assert!(ledger.store().get(SESSION_KEY).unwrap().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn commit_account_syncs_matching_session_only() {
        let mut ledger = Ledger::in_memory(LedgerConfig::default());
        let mut session = Session::default();
        ledger.set_current(&mut session, Some(ana())).unwrap();

        let mut richer = ana();
        richer.credits = 100;
        ledger.commit_account(&mut session, richer).unwrap();
        assert_eq!(session.current().unwrap().credits, 100);

        let other = Account::standard("user_2".into(), "Bo".into(), "bo@x.com".into(), 3);
        ledger.commit_account(&mut session, other).unwrap();
        assert_eq!(session.account_id(), Some("user_1"));
        assert_eq!(ledger.accounts().len(), 2);
    }

    #[test]
    fn own_account_of_deleted_user_is_not_found() {
        let mut ledger = Ledger::in_memory(LedgerConfig::default());
        let mut session = Session::default();
        ledger.set_current(&mut session, Some(ana())).unwrap();

        assert!(matches!(
            ledger.own_account(&session),
            Err(LedgerError::AccountNotFound(id)) if id == "user_1"
        ));
    }

    #[test]
    fn remove_of_unknown_email_is_none() {
        let mut ledger = Ledger::in_memory(LedgerConfig::default());
        assert!(ledger.remove_account("ghost@x.com").unwrap().is_none());
    }
}
