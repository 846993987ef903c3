//! JSON codec for patch operations (RFC 6902 wire format).

use realm_diff_json_pointer::{format_json_pointer, parse_json_pointer, Path};
use serde_json::{Map, Value};

use super::types::{Op, PatchError};

// ── Path helpers ──────────────────────────────────────────────────────────

fn decode_path(op: &Map<String, Value>, field: &str) -> Result<Path, PatchError> {
    let raw = op
        .get(field)
        .ok_or_else(|| PatchError::InvalidOp(format!("missing \"{field}\"")))?
        .as_str()
        .ok_or_else(|| PatchError::InvalidOp(format!("\"{field}\" must be a string")))?;
    parse_json_pointer(raw).map_err(|e| PatchError::InvalidOp(e.to_string()))
}

fn decode_value(op: &Map<String, Value>) -> Result<Value, PatchError> {
    op.get("value")
        .cloned()
        .ok_or_else(|| PatchError::InvalidOp("missing \"value\"".into()))
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize one operation as `{"op", "path", "value" | "from"}`.
pub fn to_json(op: &Op) -> Value {
    let mut m = Map::new();
    m.insert("op".into(), Value::String(op.op_name().into()));
    m.insert("path".into(), Value::String(format_json_pointer(op.path())));
    if let Op::Add { value, .. } | Op::Replace { value, .. } | Op::Test { value, .. } = op {
        m.insert("value".into(), value.clone());
    }
    if let Some(from) = op.from() {
        m.insert("from".into(), Value::String(format_json_pointer(from)));
    }
    Value::Object(m)
}

/// Serialize a whole patch as a JSON array.
pub fn to_json_patch(ops: &[Op]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Deserialize one operation.
pub fn from_json(v: &Value) -> Result<Op, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidOp("operation must be an object".into()))?;
    let name = obj
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| PatchError::InvalidOp("missing \"op\"".into()))?;
    let path = decode_path(obj, "path")?;
    match name {
        "add" => Ok(Op::Add { path, value: decode_value(obj)? }),
        "remove" => Ok(Op::Remove { path }),
        "replace" => Ok(Op::Replace { path, value: decode_value(obj)? }),
        "copy" => Ok(Op::Copy { path, from: decode_path(obj, "from")? }),
        "move" => Ok(Op::Move { path, from: decode_path(obj, "from")? }),
        "test" => Ok(Op::Test { path, value: decode_value(obj)? }),
        other => Err(PatchError::InvalidOp(format!("unknown op \"{other}\""))),
    }
}

/// Deserialize a JSON array of operations.
pub fn from_json_patch(v: &Value) -> Result<Vec<Op>, PatchError> {
    let arr = v
        .as_array()
        .ok_or_else(|| PatchError::InvalidOp("patch must be an array".into()))?;
    arr.iter().map(from_json).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────
