use tracing::{info, warn};

use crate::{
    common::{clock::new_id, error::LedgerError},
    domain::{account::Account, ledger::Ledger, session::Session},
};

/// Sign in by email.
///
/// The configured admin pair opens the administrator session. Any other
/// email restores its account, or creates one on first sight. Passwords of
/// standard accounts are not stored, so they are only checked for presence.
pub fn handle(
    ledger: &mut Ledger,
    session: &mut Session,
    email: &str,
    password: &str,
) -> Result<Account, LedgerError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(LedgerError::validation("Please fill in all fields."));
    }

    let admin = &ledger.config().admin;
    if email == admin.email {
        if !admin.matches(email, password) {
            warn!("rejected administrator sign-in with wrong password");
            return Err(LedgerError::InvalidCredentials);
        }
        let account = Account::administrator(
            email.to_string(),
            ledger.config().credits.admin_balance,
        );
        ledger.set_current(session, Some(account.clone()))?;
        info!("administrator signed in");
        return Ok(account);
    }

    let account = match ledger.find_account(email) {
        Some(existing) => existing.clone(),
        None => {
            let name = email.split('@').next().unwrap_or(email).to_string();
            let account = Account::standard(
                new_id("user"),
                name,
                email.to_string(),
                ledger.config().credits.signup_bonus,
            );
            ledger.upsert_account(account.clone())?;
            info!(account = %account.id, "created account on first sign-in");
            account
        }
    };

    ledger.set_current(session, Some(account.clone()))?;
    info!(account = %account.id, "signed in");
    Ok(account)
}

pub fn logout(ledger: &mut Ledger, session: &mut Session) -> Result<(), LedgerError> {
    ledger.set_current(session, None)
}
