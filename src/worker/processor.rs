use tracing::warn;

use crate::{
    common::{error::LedgerError, event::LedgerEvent},
    domain::{ledger::Ledger, payment::PaymentDraft, session::Session},
    worker::{
        admin::AdminConsole,
        handlers::{deduct, grant, login, signup, submit},
    },
};

/// Applies ledger commands against a ledger and the caller's session.
#[derive(Debug, Default)]
pub struct Processor {}
impl Processor {
    pub fn new() -> Self {
        Self {}
    }

    pub fn process(
        &mut self,
        ledger: &mut Ledger,
        session: &mut Session,
        event: LedgerEvent,
    ) -> Result<(), LedgerError> {
        match event {
            LedgerEvent::Login { email, password } => {
                login::handle(ledger, session, &email, &password)?;
            }
            LedgerEvent::Signup {
                name,
                email,
                password,
            } => {
                let form = signup::SignupForm {
                    name,
                    email,
                    confirm_password: password.clone(),
                    password,
                };
                signup::handle(ledger, session, &form)?;
            }
            LedgerEvent::Logout => login::logout(ledger, session)?,
            LedgerEvent::Deduct { amount } => {
                if !deduct::handle(ledger, session, amount)? {
                    warn!(amount, "skipping deduction: insufficient credits");
                }
            }
            LedgerEvent::Grant { amount } => {
                grant::handle(ledger, session, amount)?;
            }
            LedgerEvent::Submit {
                plan,
                amount,
                reference,
                date,
                note,
            } => {
                let draft = PaymentDraft {
                    plan,
                    amount,
                    transaction_id: reference,
                    date,
                    note,
                };
                submit::handle(ledger, session, draft)?;
            }
            LedgerEvent::Approve { reference } => {
                let id = payment_id(ledger, &reference)?;
                AdminConsole::open(ledger, session)?.approve(&id)?;
            }
            LedgerEvent::Reject { reference } => {
                let id = payment_id(ledger, &reference)?;
                AdminConsole::open(ledger, session)?.reject(&id)?;
            }
            LedgerEvent::SetCredits { email, credits } => {
                let id = account_id(ledger, &email)?;
                AdminConsole::open(ledger, session)?.set_credits(&id, credits)?;
            }
            LedgerEvent::Delete { email } => {
                let id = account_id(ledger, &email)?;
                AdminConsole::open(ledger, session)?.delete_account(&id)?;
            }
        }
        Ok(())
    }
}

fn payment_id(ledger: &Ledger, reference: &str) -> Result<String, LedgerError> {
    ledger
        .payments()
        .find_by_reference(reference)
        .map(|p| p.id.clone())
        .ok_or_else(|| LedgerError::PaymentNotFound(reference.to_string()))
}

fn account_id(ledger: &Ledger, email: &str) -> Result<String, LedgerError> {
    ledger
        .find_account(email)
        .map(|a| a.id.clone())
        .ok_or_else(|| LedgerError::AccountNotFound(email.to_string()))
}
