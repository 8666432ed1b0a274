//! Application layer containing the escrow lifecycle orchestration.
//!
//! This module defines the `EscrowEngine`, the single owner of the ledger and
//! the transaction store. Every public operation either commits completely or
//! leaves both untouched.

pub mod engine;
