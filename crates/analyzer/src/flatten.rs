use api_client::BatchPayload;
use core_types::{Record, StatTable};
use serde_json::Value;

/// Name of the field every row carries its symbol in.
pub const SYMBOL_FIELD: &str = "symbol";

/// Turns a batch payload into one row per symbol, merging the object found
/// under `nested_key` into the row and dropping the key itself.
///
/// Parent fields are copied first and nested fields overwrite them on a name
/// clash. A symbol whose nested value is missing (or not an object) keeps only
/// its parent fields, so one incomplete entry never fails the batch.
pub fn flatten_nested(payload: BatchPayload, nested_key: &str) -> StatTable {
    payload
        .into_iter()
        .map(|(symbol, value)| {
            let mut row = into_record(&symbol, value);
            match row.remove(nested_key) {
                Some(Value::Object(nested)) => row.extend(nested),
                Some(Value::Null) | None => {
                    tracing::debug!(%symbol, nested_key, "No nested data for symbol");
                }
                Some(other) => {
                    tracing::warn!(%symbol, nested_key, value = %other, "Nested value is not an object; dropped");
                }
            }
            row.insert(SYMBOL_FIELD.to_string(), Value::String(symbol.clone()));
            (symbol, row)
        })
        .collect()
}

/// Turns a batch payload into one row per symbol without any flattening.
/// Each dataset stays a field of the row.
pub fn tabulate(payload: BatchPayload) -> StatTable {
    payload
        .into_iter()
        .map(|(symbol, value)| {
            let mut row = into_record(&symbol, value);
            row.insert(SYMBOL_FIELD.to_string(), Value::String(symbol.clone()));
            (symbol, row)
        })
        .collect()
}

fn into_record(symbol: &str, value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        Value::Null => Record::new(),
        other => {
            tracing::warn!(symbol, value = %other, "Symbol entry is not an object; dropped");
            Record::new()
        }
    }
}
