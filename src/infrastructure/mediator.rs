use crate::domain::account::AccountId;
use crate::domain::ports::Mediator;
use async_trait::async_trait;
use std::io;

/// A plain mediator that accepts every transaction, quotes one flat fee for
/// both confirmation paths, and uses a fixed mediation window.
///
/// This is the standard mediator wired up by the CLI; real deployments
/// supply their own `Mediator` implementation per transaction.
pub struct FlatFeeMediator {
    fee: u64,
    expiry: u64,
}

impl FlatFeeMediator {
    pub fn new(fee: u64, expiry: u64) -> Self {
        Self { fee, expiry }
    }
}

#[async_trait]
impl Mediator for FlatFeeMediator {
    async fn request_acceptance(
        &self,
        _id: u64,
        _amount: u64,
        _owner: Option<&AccountId>,
    ) -> io::Result<bool> {
        Ok(true)
    }

    async fn confirm_fee(&self, _amount: u64) -> io::Result<u64> {
        Ok(self.fee)
    }

    async fn confirm_after_dispute_fee(&self, _amount: u64) -> io::Result<u64> {
        Ok(self.fee)
    }

    async fn mediation_expiry(&self) -> io::Result<u64> {
        Ok(self.expiry)
    }
}
