pub mod account;
pub mod account_book;
pub mod ledger;
pub mod payment;
pub mod payment_book;
pub mod plan;
pub mod session;
