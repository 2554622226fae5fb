//! Execute copy operations over JSON records.
//!
//! This is the runtime meaning of a synthesized body: what the rendered
//! statements do, applied to `serde_json::Value` objects instead of compiled
//! structs.
use serde_json::{Map, Value};
use crate::error::{Error, Result};
use crate::ir::{CopyOperation, Shape};

/// Apply `ops` in order, reading from `source` and writing into `target`.
///
/// - direct assign copies the value (a missing source member reads as `null`);
/// - coalesce assign substitutes the zero value of `default_of` for `null`;
/// - collection replace clears the target array, then appends every source
///   element in order. A `null` source or a non-array target is left as is.
pub fn apply(ops: &[CopyOperation], source: &Value, target: &mut Value) -> Result<()> {
    let source = source.as_object().ok_or(Error::NotAnObject("source"))?;
    let target = target.as_object_mut().ok_or(Error::NotAnObject("target"))?;
    for op in ops {
        let slot = op.slot();
        let read = source.get(&slot.source.name).cloned().unwrap_or(Value::Null);
        match op {
            CopyOperation::DirectAssign(_) => {
                target.insert(slot.target.name.clone(), read);
            }
            CopyOperation::CoalesceAssign { default_of, .. } => {
                let value = if read.is_null() { default_of.zero_value() } else { read };
                target.insert(slot.target.name.clone(), value);
            }
            CopyOperation::CollectionReplace(_) => replace_collection(target, &slot.target.name, &read),
        }
    }
    Ok(())
}

/// A fresh record for `shape`: every member at the zero value of its type.
pub fn blank_record(shape: &Shape) -> Value {
    let fields = shape
        .members
        .values()
        .map(|member| (member.name.clone(), member.declared_type.zero_value()))
        .collect::<Map<String, Value>>();
    Value::Object(fields)
}

/// Build a new record of `shape` and map `source` into it.
pub fn create(ops: &[CopyOperation], shape: &Shape, source: &Value) -> Result<Value> {
    let mut target = blank_record(shape);
    apply(ops, source, &mut target)?;
    Ok(target)
}

fn replace_collection(target: &mut Map<String, Value>, name: &str, read: &Value) {
    let Some(items) = read.as_array() else {
        tracing::debug!(member = name, "collection source is not an array; left unchanged");
        return;
    };
    match target.get_mut(name) {
        Some(Value::Array(into)) => {
            into.clear();
            into.extend(items.iter().cloned());
        }
        _ => tracing::debug!(member = name, "collection target is not an array; left unchanged"),
    }
}
