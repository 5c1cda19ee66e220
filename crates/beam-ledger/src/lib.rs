//! Units-ledger reconciliation: folds batches of units adjustments into beam
//! balances and pool aggregates.
//!
//! A batch flows through four stages:
//! - [`normalize`]: shape checks, action decoding, metadata validation
//! - [`resolve`]: one concurrent read round for pools, beams, users, accounts
//! - [`consolidate`]: pure per-(pool, recipient) netting and pool aggregates
//! - [`commit`]: ordered writes (identities, beams, pools)
//!
//! [`LedgerEngine`] drives the stages and also handles the pool connection
//! and flow distribution updates that touch the same rows.

pub mod audit;
pub mod batch;
pub mod commit;
pub mod config;
pub mod consolidate;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod normalize;
pub mod pool_events;
pub mod resolve;

pub use audit::{Violation, audit};
pub use batch::{BatchOrigin, Member, Route, UnitsBatch};
pub use commit::{CommitStats, commit};
pub use config::{FailureScope, LedgerConfig, UnderflowPolicy};
pub use consolidate::{Mutations, Rejection, consolidate};
pub use engine::{BatchReport, LedgerEngine};
pub use error::LedgerError;
pub use metadata::{BatchMetadata, parse_metadata};
pub use normalize::{Instruction, NormalizedBatch, normalize};
pub use pool_events::{ConnectionUpdate, DistributionUpdate, Outcome};
pub use resolve::{Resolved, resolve};
