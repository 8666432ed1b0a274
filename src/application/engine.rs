use crate::domain::account::{AccountId, Amount};
use crate::domain::notification::Notification;
use crate::domain::ports::{ClockBox, LedgerStore, LedgerStoreBox, TransactionStoreBox};
use crate::domain::transaction::{
    ContentHash, CreateRequest, EscrowTransaction, Feedback, TransactionState,
};
use crate::error::{EscrowError, Result};
use std::collections::HashMap;

/// Staged balance mutations for one operation.
///
/// Balances are read once, mutated in memory with checked arithmetic, and
/// written back only by `commit`. A failed credit or debit therefore never
/// leaves a partial ledger write behind.
struct LedgerTxn<'a> {
    store: &'a dyn LedgerStore,
    balances: HashMap<AccountId, u64>,
}

impl<'a> LedgerTxn<'a> {
    fn new(store: &'a dyn LedgerStore) -> Self {
        Self {
            store,
            balances: HashMap::new(),
        }
    }

    async fn load(&mut self, account: &AccountId) -> Result<u64> {
        if let Some(value) = self.balances.get(account) {
            return Ok(*value);
        }
        let value = self.store.balance(account).await?;
        self.balances.insert(account.clone(), value);
        Ok(value)
    }

    async fn credit(&mut self, account: &AccountId, value: u64) -> Result<()> {
        let current = self.load(account).await?;
        let updated = current
            .checked_add(value)
            .ok_or_else(|| EscrowError::BalanceOverflow(account.clone()))?;
        self.balances.insert(account.clone(), updated);
        Ok(())
    }

    async fn debit(&mut self, account: &AccountId, value: u64) -> Result<()> {
        let current = self.load(account).await?;
        let updated = current
            .checked_sub(value)
            .ok_or_else(|| EscrowError::InsufficientBalance(account.clone()))?;
        self.balances.insert(account.clone(), updated);
        Ok(())
    }

    async fn commit(self) -> Result<()> {
        for (account, value) in &self.balances {
            self.store.set_balance(account, *value).await?;
        }
        Ok(())
    }
}

enum FeeContext {
    Direct,
    AfterDispute,
}

/// The escrow settlement engine.
///
/// Owns the ledger, the transaction store, the id counter and the
/// notification log. Callers are identified by `AccountId`; the engine
/// checks the caller against the transaction's roles on every operation.
pub struct EscrowEngine {
    ledger: LedgerStoreBox,
    transactions: TransactionStoreBox,
    clock: ClockBox,
    next_id: u64,
    notifications: Vec<Notification>,
}

impl EscrowEngine {
    pub fn new(ledger: LedgerStoreBox, transactions: TransactionStoreBox, clock: ClockBox) -> Self {
        Self {
            ledger,
            transactions,
            clock,
            next_id: 0,
            notifications: Vec::new(),
        }
    }

    /// Credits an account from outside the system.
    ///
    /// This is the on-ramp used to fund participants; it is the one operation
    /// that changes total supply.
    pub async fn deposit(&mut self, account: &AccountId, amount: Amount) -> Result<()> {
        if account.is_custody() {
            return Err(EscrowError::InvalidArgument(
                "cannot deposit into the custody account".to_string(),
            ));
        }
        let mut txn = LedgerTxn::new(self.ledger.as_ref());
        txn.credit(account, amount.value()).await?;
        txn.commit().await?;
        self.notifications.push(Notification::Deposited {
            account: account.clone(),
            amount: amount.value(),
        });
        Ok(())
    }

    /// Plain movement of funds between two accounts.
    ///
    /// Self-deposits into custody are rejected; escrowing funds goes through
    /// `create_transaction` only.
    pub async fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<()> {
        if to.is_custody() {
            return Err(EscrowError::InvalidArgument(
                "transfers to the custody account are rejected".to_string(),
            ));
        }
        if from.is_custody() {
            return Err(EscrowError::Unauthorized);
        }
        let mut txn = LedgerTxn::new(self.ledger.as_ref());
        txn.debit(from, amount.value()).await?;
        txn.credit(to, amount.value()).await?;
        txn.commit().await?;
        self.notifications.push(Notification::Transferred {
            from: from.clone(),
            to: to.clone(),
            amount: amount.value(),
        });
        Ok(())
    }

    /// Opens an escrow transaction on behalf of the buyer.
    ///
    /// The candidate id is shown to the mediator and authorizer; the counter
    /// only advances when creation commits, so an aborted creation leaves no
    /// gap. A negative or failing oracle response aborts before any ledger
    /// movement.
    pub async fn create_transaction(
        &mut self,
        buyer: &AccountId,
        request: CreateRequest,
    ) -> Result<u64> {
        if buyer.is_custody() {
            return Err(EscrowError::InvalidArgument(
                "the custody account cannot open a transaction".to_string(),
            ));
        }
        let id = self.next_id;
        let tx = request.into_transaction(id, buyer.clone())?;

        if let Some(mediator) = &tx.mediator {
            let owner_id = tx.owner.as_ref().map(|o| &o.id);
            match mediator
                .adapter
                .request_acceptance(id, tx.amount.value(), owner_id)
                .await
            {
                Ok(true) => {}
                Ok(false) | Err(_) => return Err(EscrowError::MediatorRejected),
            }
        }
        if let Some(owner) = &tx.owner {
            match owner.adapter.authorize_creation(id, &tx.buyer).await {
                Ok(true) => {}
                Ok(false) | Err(_) => return Err(EscrowError::CreationNotAuthorized),
            }
        }

        let mut txn = LedgerTxn::new(self.ledger.as_ref());
        txn.debit(&tx.buyer, tx.amount.value()).await?;
        txn.credit(&AccountId::custody(), tx.amount.value()).await?;
        txn.commit().await?;

        let event = Notification::TransactionInitiated {
            id,
            owner: tx.owner.as_ref().map(|o| o.id.clone()),
            buyer: tx.buyer.clone(),
            seller: tx.seller.clone(),
            amount: tx.amount.value(),
            policy: tx.policy.clone(),
            mediator: tx.mediator.as_ref().map(|m| m.id.clone()),
            metadata: tx.metadata.clone(),
        };
        self.transactions.store(tx).await?;
        self.next_id += 1;
        self.notifications.push(event);
        Ok(id)
    }

    /// Releases the escrowed funds to the seller, charging the mediator fee
    /// where one applies. Buyer only.
    pub async fn confirm_transaction(&mut self, caller: &AccountId, id: u64) -> Result<()> {
        let mut tx = self.fetch(id).await?;
        if *caller != tx.buyer {
            return Err(EscrowError::Unauthorized);
        }
        let (fee, event) = match tx.state {
            TransactionState::Accepted => {
                let fee = quote_mediator_fee(&tx, FeeContext::Direct).await;
                (fee, Notification::TransactionConfirmed { id, fee })
            }
            TransactionState::Disputed => {
                let fee = quote_mediator_fee(&tx, FeeContext::AfterDispute).await;
                (fee, Notification::TransactionConfirmedAfterDispute { id, fee })
            }
            TransactionState::Escalated => {
                // Escalation timeout forfeits the mediator's fee entirely.
                self.ensure_mediation_elapsed(&tx).await?;
                (0, Notification::TransactionConfirmedAfterEscalation { id, fee: 0 })
            }
            state => return Err(EscrowError::InvalidState(state)),
        };

        let amount = tx.amount.value();
        let mut txn = LedgerTxn::new(self.ledger.as_ref());
        txn.debit(&AccountId::custody(), amount).await?;
        if fee > 0
            && let Some(mediator) = &tx.mediator
        {
            txn.credit(&mediator.id, fee).await?;
        }
        txn.credit(&tx.seller, amount - fee).await?;
        txn.commit().await?;

        tx.state = TransactionState::Confirmed;
        self.transactions.store(tx).await?;
        self.notifications.push(event);
        Ok(())
    }

    /// Raises a dispute before release. Buyer or seller, from `Accepted`.
    pub async fn dispute_transaction(&mut self, caller: &AccountId, id: u64) -> Result<()> {
        let mut tx = self.fetch(id).await?;
        if !tx.is_party(caller) {
            return Err(EscrowError::Unauthorized);
        }
        if tx.state != TransactionState::Accepted {
            return Err(EscrowError::InvalidState(tx.state));
        }
        tx.state = TransactionState::Disputed;
        self.transactions.store(tx).await?;
        self.notifications.push(Notification::TransactionDisputed { id });
        Ok(())
    }

    /// Escalates a dispute to mediation. Buyer or seller, from `Disputed`.
    ///
    /// Records the escalation time and a best-effort deadline snapshot; a
    /// failing expiry call leaves the snapshot at zero.
    pub async fn escalate_transaction(&mut self, caller: &AccountId, id: u64) -> Result<()> {
        let mut tx = self.fetch(id).await?;
        if !tx.is_party(caller) {
            return Err(EscrowError::Unauthorized);
        }
        if tx.state != TransactionState::Disputed {
            return Err(EscrowError::InvalidState(tx.state));
        }
        let now = self.clock.now();
        tx.escalated_at = now;
        tx.mediation_deadline = match &tx.mediator {
            Some(mediator) => match mediator.adapter.mediation_expiry().await {
                Ok(expiry) => now.saturating_add(expiry),
                Err(_) => 0,
            },
            None => 0,
        };
        tx.state = TransactionState::Escalated;
        self.transactions.store(tx).await?;
        self.notifications.push(Notification::TransactionEscalated { id });
        Ok(())
    }

    /// Cancels a transaction before any release and refunds the buyer in
    /// full. Buyer or seller, from any non-terminal state.
    pub async fn revoke_transaction(&mut self, caller: &AccountId, id: u64) -> Result<()> {
        let mut tx = self.fetch(id).await?;
        if !tx.is_party(caller) {
            return Err(EscrowError::Unauthorized);
        }
        if tx.state.is_terminal() {
            return Err(EscrowError::InvalidState(tx.state));
        }
        let amount = tx.amount.value();
        let mut txn = LedgerTxn::new(self.ledger.as_ref());
        txn.debit(&AccountId::custody(), amount).await?;
        txn.credit(&tx.buyer, amount).await?;
        txn.commit().await?;

        tx.state = TransactionState::Revoked;
        self.transactions.store(tx).await?;
        self.notifications.push(Notification::TransactionRevoked { id });
        Ok(())
    }

    /// Neutral 50/50 fallback once mediation has expired. Buyer or seller,
    /// from `Escalated`; odd amounts round in the seller's favor.
    pub async fn settle_transaction(&mut self, caller: &AccountId, id: u64) -> Result<()> {
        let mut tx = self.fetch(id).await?;
        if !tx.is_party(caller) {
            return Err(EscrowError::Unauthorized);
        }
        if tx.state != TransactionState::Escalated {
            return Err(EscrowError::InvalidState(tx.state));
        }
        self.ensure_mediation_elapsed(&tx).await?;

        let amount = tx.amount.value();
        let buyer_amount = amount / 2;
        let seller_amount = amount - buyer_amount;
        let mut txn = LedgerTxn::new(self.ledger.as_ref());
        txn.debit(&AccountId::custody(), amount).await?;
        txn.credit(&tx.buyer, buyer_amount).await?;
        txn.credit(&tx.seller, seller_amount).await?;
        txn.commit().await?;

        tx.state = TransactionState::Settled;
        self.transactions.store(tx).await?;
        self.notifications.push(Notification::TransactionSettled {
            id,
            buyer_amount,
            seller_amount,
        });
        Ok(())
    }

    /// Attaches or overwrites buyer feedback on a confirmed transaction.
    pub async fn provide_feedback(
        &mut self,
        caller: &AccountId,
        id: u64,
        rating: u8,
        comment: ContentHash,
    ) -> Result<()> {
        let mut tx = self.fetch(id).await?;
        if *caller != tx.buyer {
            return Err(EscrowError::Unauthorized);
        }
        if tx.state != TransactionState::Confirmed {
            return Err(EscrowError::InvalidState(tx.state));
        }
        let feedback = Feedback::new(rating, comment)?;
        let event = Notification::FeedbackUpdated {
            id,
            rating: feedback.rating,
            comment: feedback.comment.clone(),
        };
        tx.feedback = Some(feedback);
        self.transactions.store(tx).await?;
        self.notifications.push(event);
        Ok(())
    }

    pub async fn transaction(&self, id: u64) -> Result<Option<EscrowTransaction>> {
        Ok(self.transactions.get(id).await?)
    }

    pub async fn balance(&self, account: &AccountId) -> Result<u64> {
        Ok(self.ledger.balance(account).await?)
    }

    /// All known balances, sorted by account id.
    pub async fn balances(&self) -> Result<Vec<(AccountId, u64)>> {
        let mut balances = self.ledger.all_balances().await?;
        balances.sort();
        Ok(balances)
    }

    /// The append-only notification log, in commit order.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    async fn fetch(&self, id: u64) -> Result<EscrowTransaction> {
        self.transactions
            .get(id)
            .await?
            .ok_or(EscrowError::NotFound(id))
    }

    /// Inclusive deadline check for the escalated paths.
    ///
    /// The expiry is re-queried from the mediator on every attempt; a failing
    /// call collapses the deadline to "already elapsed" so a dead mediator
    /// can never strand funds.
    async fn ensure_mediation_elapsed(&self, tx: &EscrowTransaction) -> Result<()> {
        let expiry = match &tx.mediator {
            Some(mediator) => mediator.adapter.mediation_expiry().await.unwrap_or(0),
            None => 0,
        };
        let deadline = tx.escalated_at.saturating_add(expiry);
        if self.clock.now() >= deadline {
            Ok(())
        } else {
            Err(EscrowError::TimingNotElapsed)
        }
    }
}

/// Fee quote with the defensive defaults: no mediator, a failing call, or a
/// quote at or above the full amount all yield a zero fee.
async fn quote_mediator_fee(tx: &EscrowTransaction, context: FeeContext) -> u64 {
    let Some(mediator) = &tx.mediator else {
        return 0;
    };
    let amount = tx.amount.value();
    let quoted = match context {
        FeeContext::Direct => mediator.adapter.confirm_fee(amount).await,
        FeeContext::AfterDispute => mediator.adapter.confirm_after_dispute_fee(amount).await,
    };
    match quoted {
        Ok(fee) if fee < amount => fee,
        _ => 0,
    }
}
