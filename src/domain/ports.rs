use super::account::AccountId;
use super::transaction::EscrowTransaction;
use async_trait::async_trait;
use std::fmt;
use std::io;
use std::sync::Arc;

/// External fee-and-dispute arbiter, supplied per transaction by its creator.
///
/// Implementations are untrusted: any call may fail. Fee and expiry failures
/// are absorbed by the engine (fee 0, deadline elapsed); an acceptance
/// failure aborts creation.
#[async_trait]
pub trait Mediator: Send + Sync {
    /// Asks the mediator to accept mediating this transaction.
    async fn request_acceptance(
        &self,
        id: u64,
        amount: u64,
        owner: Option<&AccountId>,
    ) -> io::Result<bool>;

    /// Fee quote for a direct confirmation.
    async fn confirm_fee(&self, amount: u64) -> io::Result<u64>;

    /// Fee quote for a confirmation raised after a dispute.
    async fn confirm_after_dispute_fee(&self, amount: u64) -> io::Result<u64>;

    /// Mediation duration in seconds, counted from escalation.
    async fn mediation_expiry(&self) -> io::Result<u64>;
}

/// Optional external gate that must approve transaction creation.
#[async_trait]
pub trait CreationAuthorizer: Send + Sync {
    async fn authorize_creation(&self, id: u64, buyer: &AccountId) -> io::Result<bool>;
}

/// A mediator capability paired with the ledger identity its fees go to.
#[derive(Clone)]
pub struct MediatorRef {
    pub id: AccountId,
    pub adapter: Arc<dyn Mediator>,
}

impl fmt::Debug for MediatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MediatorRef({})", self.id)
    }
}

impl PartialEq for MediatorRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// An authorizer capability paired with its ledger identity.
#[derive(Clone)]
pub struct OwnerRef {
    pub id: AccountId,
    pub adapter: Arc<dyn CreationAuthorizer>,
}

impl fmt::Debug for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerRef({})", self.id)
    }
}

impl PartialEq for OwnerRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Balance store. Accounts default to a zero balance.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn balance(&self, account: &AccountId) -> io::Result<u64>;
    async fn set_balance(&self, account: &AccountId, value: u64) -> io::Result<()>;
    async fn all_balances(&self) -> io::Result<Vec<(AccountId, u64)>>;
}

/// Append-only transaction record store, keyed by id.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn store(&self, tx: EscrowTransaction) -> io::Result<()>;
    async fn get(&self, id: u64) -> io::Result<Option<EscrowTransaction>>;
}

/// Monotonic time source, in whole seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type TransactionStoreBox = Box<dyn TransactionStore>;
pub type ClockBox = Box<dyn Clock>;
