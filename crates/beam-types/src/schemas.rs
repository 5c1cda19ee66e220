//! Embedded JSON Schema documents. Source of truth lives under `spec/schemas/`.

/// Sentinel that must lead every on-chain metadata tuple.
pub const ONCHAIN_EVENT: u128 = 6_969_420;

pub const UNITS_METADATA: &str = include_str!("../../../spec/schemas/units-metadata.schema.json");

#[cfg(test)]
mod tests {
    use super::*;
    use jsonschema::JSONSchema;
    use serde_json::{Value, json};

    fn compiled() -> JSONSchema {
        let doc: Value = serde_json::from_str(UNITS_METADATA).unwrap();
        JSONSchema::compile(&doc).unwrap()
    }

    #[test]
    fn accepts_receipts_and_note() {
        let schema = compiled();
        let doc = json!({
            "poolType": 1,
            "receipts": ["tip_start_1_2", "tip_like_1_2_0xabc"],
            "note": "weekly tips"
        });
        assert!(schema.is_valid(&doc));
    }

    #[test]
    fn rejects_missing_pool_type_and_bad_receipts() {
        let schema = compiled();
        assert!(!schema.is_valid(&json!({ "receipts": [] })));
        assert!(!schema.is_valid(&json!({ "poolType": 5 })));
        assert!(!schema.is_valid(&json!({ "poolType": 0, "receipts": ["tip_like_1_2"] })));
        assert!(!schema.is_valid(&json!({ "poolType": 0, "note": "" })));
    }
}
