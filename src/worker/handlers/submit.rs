use tracing::info;

use crate::{
    common::{clock::new_id, error::LedgerError},
    domain::{
        ledger::Ledger,
        payment::{PaymentDraft, PaymentRequest, PaymentStatus},
        session::Session,
    },
};

/// File a pending purchase claim for the signed-in account.
pub fn handle(
    ledger: &mut Ledger,
    session: &Session,
    draft: PaymentDraft,
) -> Result<PaymentRequest, LedgerError> {
    let requester = ledger.own_account(session)?;
    if requester.is_admin() {
        return Err(LedgerError::validation(
            "the administrator account cannot purchase credits",
        ));
    }
    validate(&draft)?;

    let request = PaymentRequest {
        id: new_id("payment"),
        user_id: requester.id,
        user_name: requester.name,
        user_email: requester.email,
        plan: draft.plan.trim().to_string(),
        amount: draft.amount,
        transaction_id: draft.transaction_id.trim().to_string(),
        date: draft.date,
        note: draft.note.filter(|n| !n.trim().is_empty()),
        status: PaymentStatus::Pending,
        created_at: ledger.now(),
    };

    let mut next = ledger.payments().clone();
    next.append(request.clone());
    ledger.replace_payments(next)?;

    info!(
        payment = %request.id,
        account = %request.user_id,
        plan = %request.plan,
        amount = %request.amount,
        "payment request submitted"
    );
    Ok(request)
}

fn validate(draft: &PaymentDraft) -> Result<(), LedgerError> {
    if draft.transaction_id.trim().is_empty() {
        return Err(LedgerError::validation("Transaction ID is required."));
    }
    if draft.plan.trim().is_empty() {
        return Err(LedgerError::validation("Plan is required."));
    }
    if !draft.amount.is_positive() {
        return Err(LedgerError::validation("Amount must be positive."));
    }
    Ok(())
}
