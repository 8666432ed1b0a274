use super::account::AccountId;
use super::transaction::ContentHash;
use serde::Serialize;

/// Externally observable record of a committed operation.
///
/// The engine appends one notification per successful operation; the log is
/// never retracted or reordered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    Deposited {
        account: AccountId,
        amount: u64,
    },
    Transferred {
        from: AccountId,
        to: AccountId,
        amount: u64,
    },
    TransactionInitiated {
        id: u64,
        owner: Option<AccountId>,
        buyer: AccountId,
        seller: AccountId,
        amount: u64,
        policy: Option<AccountId>,
        mediator: Option<AccountId>,
        metadata: ContentHash,
    },
    TransactionDisputed {
        id: u64,
    },
    TransactionEscalated {
        id: u64,
    },
    TransactionRevoked {
        id: u64,
    },
    TransactionConfirmed {
        id: u64,
        fee: u64,
    },
    TransactionConfirmedAfterDispute {
        id: u64,
        fee: u64,
    },
    TransactionConfirmedAfterEscalation {
        id: u64,
        fee: u64,
    },
    TransactionSettled {
        id: u64,
        buyer_amount: u64,
        seller_amount: u64,
    },
    FeedbackUpdated {
        id: u64,
        rating: u8,
        comment: ContentHash,
    },
}
