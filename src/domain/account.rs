use crate::error::EscrowError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved ledger identity holding all escrowed-but-unreleased funds.
pub const CUSTODY_ACCOUNT: &str = "escrow";

/// A participant identity on the ledger.
///
/// Identities are opaque non-empty strings. One id is reserved for the
/// engine's own custody account; plain transfers to it are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Result<Self, EscrowError> {
        let id = id.into();
        if id.is_empty() {
            return Err(EscrowError::InvalidArgument(
                "account id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// The engine's custody identity.
    pub fn custody() -> Self {
        Self(CUSTODY_ACCOUNT.to_string())
    }

    pub fn is_custody(&self) -> bool {
        self.0 == CUSTODY_ACCOUNT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for AccountId {
    type Error = EscrowError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A positive amount of value.
///
/// Ensures transaction and transfer amounts are always greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub fn new(value: u64) -> Result<Self, EscrowError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(EscrowError::InvalidArgument(
                "amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for Amount {
    type Error = EscrowError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
