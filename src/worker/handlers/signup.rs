use tracing::info;

use crate::{
    common::{clock::new_id, error::LedgerError},
    domain::{account::Account, ledger::Ledger, session::Session},
};

#[derive(Debug, Clone)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Register a new standard account and sign it in.
pub fn handle(
    ledger: &mut Ledger,
    session: &mut Session,
    form: &SignupForm,
) -> Result<Account, LedgerError> {
    let name = form.name.trim();
    let email = form.email.trim();
    if name.is_empty() || email.is_empty() || form.password.is_empty() || form.confirm_password.is_empty() {
        return Err(LedgerError::validation("Please fill in all fields."));
    }
    if form.password != form.confirm_password {
        return Err(LedgerError::validation("Passwords do not match."));
    }
    if email == ledger.config().admin.email || ledger.find_account(email).is_some() {
        return Err(LedgerError::AccountExists(email.to_string()));
    }

    let account = Account::standard(
        new_id("user"),
        name.to_string(),
        email.to_string(),
        ledger.config().credits.signup_bonus,
    );
    ledger.upsert_account(account.clone())?;
    ledger.set_current(session, Some(account.clone()))?;

    info!(account = %account.id, "account registered");
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::account::{Role, Tier},
        worker::handlers::test_support::{self, account, signed_in},
    };

    fn form(name: &str, email: &str, password: &str, confirm: &str) -> SignupForm {
        SignupForm {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn signup_yields_free_standard_account_with_bonus() {
        let mut ledger = test_support::ledger();
        let mut session = Session::default();

        let acc = handle(&mut ledger, &mut session, &form("Ana", "ana@x.com", "pw", "pw")).unwrap();

        assert_eq!(acc.name, "Ana");
        assert_eq!(acc.credits, 40);
        assert_eq!(acc.tier, Tier::Free);
        assert_eq!(acc.role, Role::Standard);
        assert_eq!(session.account_id(), Some(acc.id.as_str()));
        assert_eq!(ledger.find_account("ana@x.com"), Some(&acc));
    }

    #[test]
    fn mismatched_passwords_are_rejected() {
        let mut ledger = test_support::ledger();
        let mut session = Session::default();

        let err = handle(&mut ledger, &mut session, &form("Ana", "ana@x.com", "a", "b")).unwrap_err();

        assert!(matches!(err, LedgerError::Validation(msg) if msg == "Passwords do not match."));
        assert!(ledger.accounts().is_empty());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn missing_fields_are_rejected() {
        let mut ledger = test_support::ledger();
        let mut session = Session::default();

        assert!(handle(&mut ledger, &mut session, &form("", "ana@x.com", "pw", "pw")).is_err());
        assert!(handle(&mut ledger, &mut session, &form("Ana", "ana@x.com", "pw", "")).is_err());
    }

    #[test]
    fn existing_email_keeps_its_balance() {
        let mut ledger = test_support::ledger();
        let mut session = signed_in(&mut ledger, account("user_1", "ana@x.com", 3));

        let err = handle(&mut ledger, &mut session, &form("Ana", "ana@x.com", "pw", "pw")).unwrap_err();

        assert!(matches!(err, LedgerError::AccountExists(_)));
        assert_eq!(ledger.find_account("ana@x.com").unwrap().credits, 3);
    }

    #[test]
    fn admin_email_cannot_be_registered() {
        let mut ledger = test_support::ledger();
        let mut session = Session::default();

        let err = handle(
            &mut ledger,
            &mut session,
            &form("Mallory", "root@imager.test", "pw", "pw"),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::AccountExists(_)));
    }
}
