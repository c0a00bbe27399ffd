use tracing::{debug, info};

use crate::{
    common::error::LedgerError,
    domain::{
        account::{Account, Credits},
        ledger::Ledger,
        session::Session,
    },
};

/// Charge the signed-in account.
///
/// Returns `Ok(false)` with nothing written when the balance is short.
pub fn handle(ledger: &mut Ledger, session: &mut Session, amount: Credits) -> Result<bool, LedgerError> {
    let mut account = ledger.own_account(session)?;

    if !apply_deduction(&mut account, amount) {
        debug!(account = %account.id, amount, balance = account.credits, "insufficient credits");
        return Ok(false);
    }

    let (id, remaining) = (account.id.clone(), account.credits);
    ledger.commit_account(session, account)?;
    info!(account = %id, amount, remaining, "credits deducted");
    Ok(true)
}

pub fn apply_deduction(acc: &mut Account, amount: Credits) -> bool {
    if !acc.can_afford(amount) {
        return false;
    }
    acc.credits -= amount;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::handlers::test_support::{self, account, admin_session, signed_in};

    #[test]
    fn deducts_and_syncs_book_and_session() {
        let mut ledger = test_support::ledger();
        let mut session = signed_in(&mut ledger, account("user_1", "ana@x.com", 40));

        assert!(handle(&mut ledger, &mut session, 12).unwrap());

        assert_eq!(ledger.find_account("ana@x.com").unwrap().credits, 28);
        assert_eq!(session.current().unwrap().credits, 28);
        assert_eq!(ledger.restore_session().current().unwrap().credits, 28);
    }

    #[test]
    fn exact_balance_can_be_spent() {
        let mut ledger = test_support::ledger();
        let mut session = signed_in(&mut ledger, account("user_1", "ana@x.com", 40));

        assert!(handle(&mut ledger, &mut session, 40).unwrap());
        assert_eq!(session.current().unwrap().credits, 0);
    }

    #[test]
    fn overdraft_fails_without_mutation() {
        let mut ledger = test_support::ledger();
        let mut session = signed_in(&mut ledger, account("user_1", "ana@x.com", 40));

        for amount in [41, 40 * 1000] {
            assert!(!handle(&mut ledger, &mut session, amount).unwrap());
            assert_eq!(ledger.find_account("ana@x.com").unwrap().credits, 40);
            assert_eq!(session.current().unwrap().credits, 40);
        }
    }

    #[test]
    fn requires_a_session() {
        let mut ledger = test_support::ledger();
        let mut session = Session::default();

        assert!(matches!(
            handle(&mut ledger, &mut session, 1),
            Err(LedgerError::NotAuthenticated)
        ));
    }

    #[test]
    fn admin_spend_stays_out_of_the_book() {
        let mut ledger = test_support::ledger();
        let mut session = admin_session(&mut ledger);

        assert!(handle(&mut ledger, &mut session, 8).unwrap());

        assert_eq!(session.current().unwrap().credits, 99_991);
        assert!(ledger.accounts().is_empty());
    }

    #[test]
    fn reads_balance_from_book_not_stale_session() {
        let mut ledger = test_support::ledger();
        let mut session = signed_in(&mut ledger, account("user_1", "ana@x.com", 40));
        // admin edit lands in the book only
        ledger.upsert_account(account("user_1", "ana@x.com", 5)).unwrap();

        assert!(!handle(&mut ledger, &mut session, 10).unwrap());
        assert!(handle(&mut ledger, &mut session, 5).unwrap());
        assert_eq!(session.current().unwrap().credits, 0);
    }

    #[test]
    fn apply_deduction_is_all_or_nothing() {
        let mut acc = account("user_1", "ana@x.com", 3);
        assert!(!apply_deduction(&mut acc, 4));
        assert_eq!(acc.credits, 3);
        assert!(apply_deduction(&mut acc, 3));
        assert_eq!(acc.credits, 0);
    }
}
