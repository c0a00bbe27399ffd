#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("missing commands csv path. usage: imager-ledger <commands.csv>")]
    MissingArg,
    #[error("failed to open input file: {0}")]
    OpenInput(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Failures surfaced by ledger operations.
///
/// Insufficient balance is not represented here: deductions report it as
/// `Ok(false)` because it is an expected outcome, not a fault.
#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("no active session")]
    NotAuthenticated,
    #[error("administrator session required")]
    Forbidden,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account already exists: {0}")]
    AccountExists(String),
    #[error("account not found: {0}")]
    AccountNotFound(String),
    #[error("payment request not found: {0}")]
    PaymentNotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }

    /// Everything except storage faults is a local, per-request condition.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, LedgerError::Storage(_))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
