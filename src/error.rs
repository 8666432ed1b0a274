use crate::domain::account::AccountId;
use crate::domain::transaction::TransactionState;
use thiserror::Error;

/// Failure modes of the escrow engine.
///
/// Every variant means the whole operation was rejected: ledger, transaction
/// store, id counter and notification log are untouched on the error path.
#[derive(Error, Debug)]
pub enum EscrowError {
    #[error("transaction {0} not found")]
    NotFound(u64),
    #[error("caller is not permitted to perform this operation")]
    Unauthorized,
    #[error("operation not valid in state {0:?}")]
    InvalidState(TransactionState),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("insufficient balance for account {0}")]
    InsufficientBalance(AccountId),
    #[error("balance overflow for account {0}")]
    BalanceOverflow(AccountId),
    #[error("mediation deadline has not elapsed")]
    TimingNotElapsed,
    #[error("mediator declined to mediate the transaction")]
    MediatorRejected,
    #[error("transaction creation was not authorized")]
    CreationNotAuthorized,
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, EscrowError>;
