use beam_store::EntityStore;
use beam_types::Action;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, error, info, info_span};

use crate::{
    batch::UnitsBatch,
    commit::{CommitStats, commit},
    config::LedgerConfig,
    consolidate::{Rejection, consolidate},
    error::LedgerError,
    metadata::BatchMetadata,
    normalize::normalize,
    resolve::resolve,
};

/// Summary of one applied batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub event: String,
    pub action: Action,
    pub instructions: usize,
    pub metadata: BatchMetadata,
    pub written: CommitStats,
    pub rejected: Vec<Rejection>,
    pub skipped_pools: Vec<String>,
}

/// Applies units batches against an entity store.
///
/// Batches must be applied one after another; `&mut self` on
/// [`LedgerEngine::apply_batch`] keeps a single engine from interleaving them.
#[derive(Debug)]
pub struct LedgerEngine<S> {
    store: S,
    config: LedgerConfig,
}

impl<S: EntityStore> LedgerEngine<S> {
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Normalizes, resolves, consolidates and commits one batch.
    ///
    /// Shape, metadata and unknown-pool failures return before any write.
    /// Everything logged while the batch runs sits inside a `units_batch`
    /// span carrying the chain id, event key, block and tx hash.
    pub async fn apply_batch(&mut self, batch: &UnitsBatch) -> Result<BatchReport, LedgerError> {
        let event = batch.origin.event_key(batch.chain_id);
        let span = info_span!(
            "units_batch",
            chain_id = batch.chain_id,
            event = %event,
            block = batch.origin.block_number,
            tx = %batch.origin.tx_hash
        );
        async {
            match self.run(batch, &event).await {
                Ok(report) => {
                    info!(
                        instructions = report.instructions,
                        beams = report.written.beams,
                        pools = report.written.pools,
                        rejected = report.rejected.len(),
                        "applied units batch"
                    );
                    Ok(report)
                }
                Err(err) => {
                    error!(error = %err, "units batch rejected");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, batch: &UnitsBatch, event: &str) -> Result<BatchReport, LedgerError> {
        let normalized = normalize(batch, &self.config)?;
        debug!(
            pool_type = ?normalized.metadata.pool_type,
            receipts = normalized.metadata.receipts.len(),
            "normalized units batch"
        );

        let resolved = resolve(&self.store, &normalized.instructions, &self.config).await?;
        let mut mutations = consolidate(
            &normalized.instructions,
            &resolved,
            &self.config,
            normalized.origin.timestamp,
        )?;
        let rejected = std::mem::take(&mut mutations.rejected);
        let written = commit(&self.store, mutations).await?;

        Ok(BatchReport {
            event: event.to_string(),
            action: normalized.action,
            instructions: normalized.instructions.len(),
            metadata: normalized.metadata,
            written,
            rejected,
            skipped_pools: resolved.skipped_pools,
        })
    }
}
