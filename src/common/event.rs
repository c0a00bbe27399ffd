use chrono::NaiveDate;

use crate::{common::money::Money, domain::account::Credits};

/// A ledger command, sent from the reader to the worker for processing.
///
/// Admin commands address accounts by email and payment requests by their
/// external transaction reference, since generated ids are unknown to the
/// author of a command file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    Login {
        email: String,
        password: String,
    },
    Signup {
        name: String,
        email: String,
        password: String,
    },
    Logout,
    Deduct {
        amount: Credits,
    },
    Grant {
        amount: Credits,
    },
    Submit {
        plan: String,
        amount: Money,
        reference: String,
        date: NaiveDate,
        note: Option<String>,
    },
    Approve {
        reference: String,
    },
    Reject {
        reference: String,
    },
    SetCredits {
        email: String,
        credits: Credits,
    },
    Delete {
        email: String,
    },
}
