use super::account::{AccountId, Amount};
use super::ports::{MediatorRef, OwnerRef};
use crate::error::{EscrowError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque content fingerprint for transaction metadata and feedback comments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContentHash {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of an escrow transaction.
///
/// `Confirmed`, `Settled` and `Revoked` are terminal: once reached, the only
/// permitted mutation is feedback on a `Confirmed` transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    Accepted,
    Disputed,
    Escalated,
    Confirmed,
    Settled,
    Revoked,
}

impl TransactionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Settled | Self::Revoked)
    }
}

/// Buyer feedback on a confirmed transaction. Overwritable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub rating: u8,
    pub comment: ContentHash,
}

impl Feedback {
    pub fn new(rating: u8, comment: ContentHash) -> Result<Self> {
        if !(1..=5).contains(&rating) {
            return Err(EscrowError::InvalidArgument(format!(
                "rating must be between 1 and 5, got {rating}"
            )));
        }
        Ok(Self { rating, comment })
    }
}

/// Everything a buyer supplies to open an escrow transaction.
///
/// Only `into_transaction` can turn a request into an `EscrowTransaction`,
/// so an invalid combination never yields a record.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub seller: AccountId,
    pub amount: Amount,
    pub metadata: ContentHash,
    pub policy: Option<AccountId>,
    pub mediator: Option<MediatorRef>,
    pub owner: Option<OwnerRef>,
}

impl CreateRequest {
    /// Validates the request against the buyer and builds the record in its
    /// initial `Accepted` state.
    pub fn into_transaction(self, id: u64, buyer: AccountId) -> Result<EscrowTransaction> {
        if self.seller == buyer {
            return Err(EscrowError::InvalidArgument(
                "seller and buyer must differ".to_string(),
            ));
        }
        if let Some(owner) = &self.owner {
            if owner.id == buyer || owner.id == self.seller {
                return Err(EscrowError::InvalidArgument(
                    "owner must differ from buyer and seller".to_string(),
                ));
            }
        }
        if self.policy.is_some() != self.mediator.is_some() {
            return Err(EscrowError::InvalidArgument(
                "policy and mediator must both be present or both absent".to_string(),
            ));
        }
        let participants = [
            Some(&self.seller),
            self.policy.as_ref(),
            self.mediator.as_ref().map(|m| &m.id),
            self.owner.as_ref().map(|o| &o.id),
        ];
        if participants.into_iter().flatten().any(|p| p.is_custody()) {
            return Err(EscrowError::InvalidArgument(
                "the custody account cannot participate in a transaction".to_string(),
            ));
        }
        Ok(EscrowTransaction {
            id,
            buyer,
            seller: self.seller,
            owner: self.owner,
            amount: self.amount,
            policy: self.policy,
            mediator: self.mediator,
            metadata: self.metadata,
            state: TransactionState::Accepted,
            escalated_at: 0,
            mediation_deadline: 0,
            feedback: None,
        })
    }
}

/// A single escrow transaction record.
///
/// Created once, mutated only by the engine, never deleted. `escalated_at`
/// and `mediation_deadline` are zero until the transaction is escalated;
/// `mediation_deadline` stays zero when the mediator's expiry call failed.
#[derive(Debug, Clone, PartialEq)]
pub struct EscrowTransaction {
    pub id: u64,
    pub buyer: AccountId,
    pub seller: AccountId,
    pub owner: Option<OwnerRef>,
    pub amount: Amount,
    pub policy: Option<AccountId>,
    pub mediator: Option<MediatorRef>,
    pub metadata: ContentHash,
    pub state: TransactionState,
    pub escalated_at: u64,
    pub mediation_deadline: u64,
    pub feedback: Option<Feedback>,
}

impl EscrowTransaction {
    /// Whether the caller is the buyer or the seller.
    pub fn is_party(&self, caller: &AccountId) -> bool {
        *caller == self.buyer || *caller == self.seller
    }
}
