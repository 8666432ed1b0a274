#![allow(dead_code)]

use async_trait::async_trait;
use custodia::application::engine::EscrowEngine;
use custodia::domain::account::{AccountId, Amount};
use custodia::domain::ports::{CreationAuthorizer, Mediator, MediatorRef, OwnerRef};
use custodia::domain::transaction::{ContentHash, CreateRequest};
use custodia::infrastructure::clock::ManualClock;
use custodia::infrastructure::in_memory::{InMemoryLedger, InMemoryTransactionStore};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub const DEFAULT_FEE: u64 = 10;
pub const DEFAULT_EXPIRY: u64 = 600;

pub fn account(name: &str) -> AccountId {
    AccountId::new(name).unwrap()
}

pub fn amount(value: u64) -> Amount {
    Amount::new(value).unwrap()
}

/// Scriptable mediator: fees, expiry, acceptance and failure are all
/// adjustable mid-test, and calls are counted.
pub struct MockMediator {
    accept: AtomicBool,
    raise_error: AtomicBool,
    confirm_fee: AtomicU64,
    dispute_fee: AtomicU64,
    expiry: AtomicU64,
    expiry_calls: AtomicU64,
    acceptance_calls: AtomicU64,
    seen_id: AtomicU64,
    seen_amount: AtomicU64,
}

impl MockMediator {
    pub fn new() -> Self {
        Self {
            accept: AtomicBool::new(true),
            raise_error: AtomicBool::new(false),
            confirm_fee: AtomicU64::new(DEFAULT_FEE),
            dispute_fee: AtomicU64::new(DEFAULT_FEE),
            expiry: AtomicU64::new(DEFAULT_EXPIRY),
            expiry_calls: AtomicU64::new(0),
            acceptance_calls: AtomicU64::new(0),
            seen_id: AtomicU64::new(u64::MAX),
            seen_amount: AtomicU64::new(0),
        }
    }

    pub fn set_accept(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }

    pub fn set_raise_error(&self, raise: bool) {
        self.raise_error.store(raise, Ordering::SeqCst);
    }

    pub fn set_confirm_fee(&self, fee: u64) {
        self.confirm_fee.store(fee, Ordering::SeqCst);
    }

    pub fn set_dispute_fee(&self, fee: u64) {
        self.dispute_fee.store(fee, Ordering::SeqCst);
    }

    pub fn set_expiry(&self, expiry: u64) {
        self.expiry.store(expiry, Ordering::SeqCst);
    }

    pub fn expiry_calls(&self) -> u64 {
        self.expiry_calls.load(Ordering::SeqCst)
    }

    pub fn acceptance_calls(&self) -> u64 {
        self.acceptance_calls.load(Ordering::SeqCst)
    }

    pub fn seen_id(&self) -> u64 {
        self.seen_id.load(Ordering::SeqCst)
    }

    pub fn seen_amount(&self) -> u64 {
        self.seen_amount.load(Ordering::SeqCst)
    }

    fn check(&self) -> io::Result<()> {
        if self.raise_error.load(Ordering::SeqCst) {
            return Err(io::Error::other("mediator failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl Mediator for MockMediator {
    async fn request_acceptance(
        &self,
        id: u64,
        amount: u64,
        _owner: Option<&AccountId>,
    ) -> io::Result<bool> {
        self.acceptance_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_id.store(id, Ordering::SeqCst);
        self.seen_amount.store(amount, Ordering::SeqCst);
        self.check()?;
        Ok(self.accept.load(Ordering::SeqCst))
    }

    async fn confirm_fee(&self, amount: u64) -> io::Result<u64> {
        self.seen_amount.store(amount, Ordering::SeqCst);
        self.check()?;
        Ok(self.confirm_fee.load(Ordering::SeqCst))
    }

    async fn confirm_after_dispute_fee(&self, amount: u64) -> io::Result<u64> {
        self.seen_amount.store(amount, Ordering::SeqCst);
        self.check()?;
        Ok(self.dispute_fee.load(Ordering::SeqCst))
    }

    async fn mediation_expiry(&self) -> io::Result<u64> {
        self.expiry_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.expiry.load(Ordering::SeqCst))
    }
}

pub struct MockAuthorizer {
    approve: AtomicBool,
    raise_error: AtomicBool,
    seen_id: AtomicU64,
}

impl MockAuthorizer {
    pub fn new() -> Self {
        Self {
            approve: AtomicBool::new(true),
            raise_error: AtomicBool::new(false),
            seen_id: AtomicU64::new(u64::MAX),
        }
    }

    pub fn set_approve(&self, approve: bool) {
        self.approve.store(approve, Ordering::SeqCst);
    }

    pub fn set_raise_error(&self, raise: bool) {
        self.raise_error.store(raise, Ordering::SeqCst);
    }

    pub fn seen_id(&self) -> u64 {
        self.seen_id.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CreationAuthorizer for MockAuthorizer {
    async fn authorize_creation(&self, id: u64, _buyer: &AccountId) -> io::Result<bool> {
        self.seen_id.store(id, Ordering::SeqCst);
        if self.raise_error.load(Ordering::SeqCst) {
            return Err(io::Error::other("authorizer failure"));
        }
        Ok(self.approve.load(Ordering::SeqCst))
    }
}

/// A funded engine with a scriptable mediator, plus helpers that drive a
/// transaction into each lifecycle state.
pub struct TestBed {
    pub engine: EscrowEngine,
    pub clock: ManualClock,
    pub mediator: Arc<MockMediator>,
    pub buyer: AccountId,
    pub seller: AccountId,
    pub mediator_id: AccountId,
    pub policy_id: AccountId,
}

impl TestBed {
    pub fn new() -> Self {
        let clock = ManualClock::new(1_000_000);
        let engine = EscrowEngine::new(
            Box::new(InMemoryLedger::new()),
            Box::new(InMemoryTransactionStore::new()),
            Box::new(clock.clone()),
        );
        Self {
            engine,
            clock,
            mediator: Arc::new(MockMediator::new()),
            buyer: account("buyer"),
            seller: account("seller"),
            mediator_id: account("mediator"),
            policy_id: account("policy"),
        }
    }

    pub fn mediator_ref(&self) -> MediatorRef {
        MediatorRef {
            id: self.mediator_id.clone(),
            adapter: self.mediator.clone(),
        }
    }

    pub fn owner_ref(&self, authorizer: Arc<MockAuthorizer>) -> OwnerRef {
        OwnerRef {
            id: account("owner"),
            adapter: authorizer,
        }
    }

    pub fn plain_request(&self, value: u64) -> CreateRequest {
        CreateRequest {
            seller: self.seller.clone(),
            amount: amount(value),
            metadata: ContentHash::from("metadata"),
            policy: None,
            mediator: None,
            owner: None,
        }
    }

    pub fn mediated_request(&self, value: u64) -> CreateRequest {
        CreateRequest {
            policy: Some(self.policy_id.clone()),
            mediator: Some(self.mediator_ref()),
            ..self.plain_request(value)
        }
    }

    pub async fn fund_buyer(&mut self, value: u64) {
        self.engine.deposit(&self.buyer, amount(value)).await.unwrap();
    }

    /// Funds the buyer and opens a mediated transaction of `value`.
    pub async fn create_mediated(&mut self, value: u64) -> u64 {
        self.fund_buyer(value).await;
        let request = self.mediated_request(value);
        self.engine
            .create_transaction(&self.buyer, request)
            .await
            .unwrap()
    }

    pub async fn create_plain(&mut self, value: u64) -> u64 {
        self.fund_buyer(value).await;
        let request = self.plain_request(value);
        self.engine
            .create_transaction(&self.buyer, request)
            .await
            .unwrap()
    }

    pub async fn disputed(&mut self, value: u64) -> u64 {
        let id = self.create_mediated(value).await;
        self.engine
            .dispute_transaction(&self.seller, id)
            .await
            .unwrap();
        id
    }

    pub async fn escalated(&mut self, value: u64) -> u64 {
        let id = self.disputed(value).await;
        self.engine
            .escalate_transaction(&self.buyer, id)
            .await
            .unwrap();
        id
    }

    pub async fn confirmed(&mut self, value: u64) -> u64 {
        let id = self.create_mediated(value).await;
        self.engine
            .confirm_transaction(&self.buyer, id)
            .await
            .unwrap();
        id
    }

    pub async fn balance(&self, name: &str) -> u64 {
        self.engine.balance(&account(name)).await.unwrap()
    }

    pub async fn custody_balance(&self) -> u64 {
        self.engine
            .balance(&AccountId::custody())
            .await
            .unwrap()
    }
}
