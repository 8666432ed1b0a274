use crate::domain::account::AccountId;
use crate::domain::ports::{LedgerStore, TransactionStore};
use crate::domain::transaction::EscrowTransaction;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory balance store.
///
/// Uses `Arc<RwLock<HashMap<AccountId, u64>>>` for shared access; unknown
/// accounts read as zero.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    balances: Arc<RwLock<HashMap<AccountId, u64>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn balance(&self, account: &AccountId) -> io::Result<u64> {
        let balances = self.balances.read().await;
        Ok(balances.get(account).copied().unwrap_or(0))
    }

    async fn set_balance(&self, account: &AccountId, value: u64) -> io::Result<()> {
        let mut balances = self.balances.write().await;
        balances.insert(account.clone(), value);
        Ok(())
    }

    async fn all_balances(&self) -> io::Result<Vec<(AccountId, u64)>> {
        let balances = self.balances.read().await;
        Ok(balances.iter().map(|(k, v)| (k.clone(), *v)).collect())
    }
}

/// In-memory transaction store keyed by id.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<HashMap<u64, EscrowTransaction>>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn store(&self, tx: EscrowTransaction) -> io::Result<()> {
        let mut transactions = self.transactions.write().await;
        transactions.insert(tx.id, tx);
        Ok(())
    }

    async fn get(&self, id: u64) -> io::Result<Option<EscrowTransaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(&id).cloned())
    }
}
