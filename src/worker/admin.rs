use tracing::info;

use crate::{
    common::error::LedgerError,
    domain::{
        account::{Account, Credits},
        ledger::Ledger,
        payment::{PaymentRequest, PaymentStatus},
        session::Session,
    },
    generation::api_key::ApiKeyStatus,
    worker::handlers::{approve, reject},
};

/// Administrative view over the account and payment books.
///
/// Only constructible from an administrator session.
pub struct AdminConsole<'a> {
    ledger: &'a mut Ledger,
    session: &'a mut Session,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedAccount {
    pub account: Account,
    pub payments_removed: usize,
}

impl<'a> AdminConsole<'a> {
    pub fn open(ledger: &'a mut Ledger, session: &'a mut Session) -> Result<Self, LedgerError> {
        if !session.is_authenticated() {
            return Err(LedgerError::NotAuthenticated);
        }
        if !session.is_admin() {
            return Err(LedgerError::Forbidden);
        }
        Ok(Self { ledger, session })
    }

    /// Every standard account, ordered by email.
    pub fn list_users(&self) -> Vec<Account> {
        let mut users: Vec<Account> = self
            .ledger
            .accounts()
            .iter()
            .filter(|a| !a.is_admin())
            .cloned()
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        users
    }

    /// Case-insensitive match on name or email.
    pub fn search_users(&self, term: &str) -> Vec<Account> {
        let needle = term.trim().to_lowercase();
        self.list_users()
            .into_iter()
            .filter(|a| {
                a.name.to_lowercase().contains(&needle) || a.email.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Overwrite a balance, bypassing the deduct/grant rules.
    pub fn set_credits(&mut self, id: &str, credits: Credits) -> Result<Account, LedgerError> {
        let mut account = self.standard_account(id)?;
        let previous = account.credits;
        account.credits = credits;
        self.ledger.commit_account(self.session, account.clone())?;
        info!(account = %id, previous, credits, "balance overridden by administrator");
        Ok(account)
    }

    /// Remove an account together with all of its payment requests.
    pub fn delete_account(&mut self, id: &str) -> Result<DeletedAccount, LedgerError> {
        let account = self.standard_account(id)?;

        // Account first: if the purge then fails, the leftover requests are
        // orphans that approval already tolerates, and no history is lost
        // for an account that still exists.
        self.ledger.remove_account(&account.email)?;
        let mut payments = self.ledger.payments().clone();
        let payments_removed = payments.purge_account(id);
        self.ledger.replace_payments(payments)?;

        info!(account = %id, payments_removed, "account deleted");
        Ok(DeletedAccount {
            account,
            payments_removed,
        })
    }

    pub fn list_payments(&self) -> Vec<PaymentRequest> {
        self.ledger.payments().list_all()
    }

    pub fn approve(&mut self, payment_id: &str) -> Result<PaymentStatus, LedgerError> {
        approve::handle(self.ledger, self.session, payment_id)
    }

    pub fn reject(&mut self, payment_id: &str) -> Result<PaymentStatus, LedgerError> {
        reject::handle(self.ledger, payment_id)
    }

    pub fn api_key_status(&self) -> ApiKeyStatus {
        ApiKeyStatus::of(self.ledger.api_key())
    }

    pub fn set_api_key(&mut self, key: &str) -> Result<(), LedgerError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(LedgerError::validation("API key must not be empty."));
        }
        self.ledger.replace_api_key(Some(key.to_string()))?;
        info!("api key override updated");
        Ok(())
    }

    pub fn remove_api_key(&mut self) -> Result<(), LedgerError> {
        self.ledger.replace_api_key(None)?;
        info!("api key override removed");
        Ok(())
    }

    fn standard_account(&self, id: &str) -> Result<Account, LedgerError> {
        self.ledger
            .find_account_by_id(id)
            .filter(|a| !a.is_admin())
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))
    }
}
