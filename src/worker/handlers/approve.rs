use tracing::{debug, info, warn};

use crate::{
    common::error::LedgerError,
    domain::{
        account::Account,
        ledger::Ledger,
        payment::PaymentStatus,
        plan::PlanGrant,
        session::Session,
    },
    worker::handlers::grant::apply_grant,
};

/// Approve a pending payment: credit the requester, promote their tier if
/// the plan warrants it, then mark the request approved.
///
/// Deciding an already-decided request changes nothing and reports its
/// current status.
pub(crate) fn handle(
    ledger: &mut Ledger,
    session: &mut Session,
    payment_id: &str,
) -> Result<PaymentStatus, LedgerError> {
    let payment = ledger
        .payments()
        .get(payment_id)
        .cloned()
        .ok_or_else(|| LedgerError::PaymentNotFound(payment_id.to_string()))?;

    if payment.status.is_terminal() {
        debug!(payment = %payment.id, status = ?payment.status, "payment already decided");
        return Ok(payment.status);
    }

    let grant = PlanGrant::resolve(&payment.plan);
    if !grant.catalogued {
        warn!(
            payment = %payment.id,
            plan = %payment.plan,
            credits = grant.credits,
            "plan not in catalogue; granting leading credit count without promotion"
        );
    }

    match ledger.find_account_by_id(&payment.user_id).cloned() {
        Some(mut account) => {
            apply_plan(&mut account, grant);
            let (credits, tier) = (account.credits, account.tier);
            ledger.commit_account(session, account)?;
            info!(
                payment = %payment.id,
                account = %payment.user_id,
                granted = grant.credits,
                balance = credits,
                %tier,
                "payment approved"
            );
        }
        None => warn!(
            payment = %payment.id,
            account = %payment.user_id,
            "requester no longer exists; approving without credit"
        ),
    }

    let mut next = ledger.payments().clone();
    if let Some(p) = next.get_mut(payment_id) {
        p.set_status(PaymentStatus::Approved);
    }
    ledger.replace_payments(next)?;
    Ok(PaymentStatus::Approved)
}

pub fn apply_plan(acc: &mut Account, grant: PlanGrant) {
    apply_grant(acc, grant.credits);
    if let Some(target) = grant.promotes_to {
        acc.tier = acc.tier.promoted_to(target);
    }
}
