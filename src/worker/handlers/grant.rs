use tracing::info;

use crate::{
    common::error::LedgerError,
    domain::{
        account::{Account, Credits},
        ledger::Ledger,
        session::Session,
    },
};

/// Credit the signed-in account unconditionally. Returns the new balance.
pub fn handle(ledger: &mut Ledger, session: &mut Session, amount: Credits) -> Result<Credits, LedgerError> {
    let mut account = ledger.own_account(session)?;
    apply_grant(&mut account, amount);

    let (id, balance) = (account.id.clone(), account.credits);
    ledger.commit_account(session, account)?;
    info!(account = %id, amount, balance, "credits granted");
    Ok(balance)
}

pub fn apply_grant(acc: &mut Account, amount: Credits) {
    acc.credits = acc.credits.saturating_add(amount);
}
