//! Field-op evaluation shared by every DocStore implementation.
//!
//! A store applies the whole batch to one document while holding whatever
//! makes the call atomic for it (a write lock, a write transaction). The
//! semantics here are the contract; implementations only differ in how they
//! load and persist the document around this function.

use serde_json::Value;

use crate::error::DocError;
use crate::traits::FieldOp;

/// Get the current time as an RFC 3339 string.
///
/// Kept local so the store crate does not depend on the shared core crate.
/// The format must stay byte-compatible with `chirp_core::now_rfc3339`:
/// stored timestamps are compared lexicographically across both.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Apply a batch of field ops to a document, in order.
///
/// The document must be a JSON object. Missing fields materialize as the
/// op's identity value (empty array for set ops, 0 for increments).
pub fn apply_ops(doc: &mut Value, ops: &[FieldOp]) -> Result<(), DocError> {
    let obj = doc
        .as_object_mut()
        .ok_or_else(|| DocError::Serialization("document is not a JSON object".into()))?;

    for op in ops {
        match op {
            FieldOp::AddToSet(field, value) => {
                let arr = array_field(obj, field)?;
                if !arr.contains(value) {
                    arr.push(value.clone());
                }
            }
            FieldOp::RemoveFromSet(field, value) => {
                // Absent field stays absent; nothing to remove.
                if let Some(existing) = obj.get_mut(field) {
                    let arr = existing.as_array_mut().ok_or_else(|| {
                        DocError::Serialization(format!("field '{field}' is not an array"))
                    })?;
                    arr.retain(|v| v != value);
                }
            }
            FieldOp::Increment(field, delta) => {
                let current = match obj.get(field) {
                    None | Some(Value::Null) => 0,
                    Some(v) => v.as_i64().ok_or_else(|| {
                        DocError::Serialization(format!("field '{field}' is not an integer"))
                    })?,
                };
                obj.insert(field.clone(), Value::from(current + delta));
            }
            FieldOp::Set(field, value) => {
                obj.insert(field.clone(), value.clone());
            }
            FieldOp::TimestampNow(field) => {
                obj.insert(field.clone(), Value::from(now_rfc3339()));
            }
        }
    }

    Ok(())
}

fn array_field<'a>(
    obj: &'a mut serde_json::Map<String, Value>,
    field: &str,
) -> Result<&'a mut Vec<Value>, DocError> {
    let entry = obj
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    // Null (e.g. a cleared field) is upgraded to an empty array.
    if entry.is_null() {
        *entry = Value::Array(Vec::new());
    }
    entry
        .as_array_mut()
        .ok_or_else(|| DocError::Serialization(format!("field '{field}' is not an array")))
}
