use tracing::{debug, info};

use crate::{
    common::error::LedgerError,
    domain::{ledger::Ledger, payment::PaymentStatus},
};

/// Mark a pending payment rejected. No balance or tier changes.
pub(crate) fn handle(ledger: &mut Ledger, payment_id: &str) -> Result<PaymentStatus, LedgerError> {
    let status = ledger
        .payments()
        .get(payment_id)
        .map(|p| p.status)
        .ok_or_else(|| LedgerError::PaymentNotFound(payment_id.to_string()))?;

    if status.is_terminal() {
        debug!(payment = %payment_id, ?status, "payment already decided");
        return Ok(status);
    }

    let mut next = ledger.payments().clone();
    if let Some(p) = next.get_mut(payment_id) {
        p.set_status(PaymentStatus::Rejected);
    }
    ledger.replace_payments(next)?;

    info!(payment = %payment_id, "payment rejected");
    Ok(PaymentStatus::Rejected)
}
