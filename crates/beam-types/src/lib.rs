//! Beam ledger data model: entity records, action kinds, and stable key derivation.

pub mod keys;
mod model;
mod receipt;
pub mod schemas;

pub use model::*;
pub use receipt::{ReceiptKey, ReceiptKeyError};
