//! Sentinel and JSON Schema checks for the metadata tuple attached to a batch.

use beam_types::{PoolType, ReceiptKey, schemas::UNITS_METADATA};
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LedgerError;

static UNITS_METADATA_SCHEMA: Lazy<JSONSchema> = Lazy::new(|| {
    let doc: Value = serde_json::from_str(UNITS_METADATA)
        .expect("spec/schemas/units-metadata.schema.json must parse");
    JSONSchema::compile(&doc).expect("units metadata schema must compile")
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMetadata {
    pub pool_type: PoolType,
    #[serde(default)]
    pub receipts: Vec<ReceiptKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub fn parse_metadata(metadata: &(u128, String), sentinel: u128) -> Result<BatchMetadata, LedgerError> {
    let (marker, payload) = metadata;
    if *marker != sentinel {
        return Err(LedgerError::invalid_metadata(format!(
            "expected sentinel {sentinel}, found {marker}"
        )));
    }

    let doc: Value = serde_json::from_str(payload)
        .map_err(|err| LedgerError::invalid_metadata(format!("payload is not JSON: {err}")))?;

    if let Err(errors) = UNITS_METADATA_SCHEMA.validate(&doc) {
        let msgs: Vec<String> = errors
            .map(|e| format!("{}: {}", e.instance_path, e))
            .collect();
        return Err(LedgerError::invalid_metadata(format!(
            "schema validation failed: {}",
            msgs.join("; ")
        )));
    }

    serde_json::from_value(doc).map_err(|err| LedgerError::invalid_metadata(err.to_string()))
}
