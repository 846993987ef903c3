//! JSON Patch apply logic over canonical trees.
//!
//! Operation values arrive in raw form and are canonicalized on entry, so a
//! record added under `/clients/<id>` lands as a canonical subtree and later
//! operations can address into it by id.

use realm_diff_json_pointer::{is_proper_prefix, parse_index, split_last};

use super::types::{ApplyFailure, Op, PatchError};
use crate::canonical::{canonicalize, Canonical};

// ── Individual operation applicators ─────────────────────────────────────

fn get_at<'a>(doc: &'a Canonical, path: &[String]) -> Result<&'a Canonical, PatchError> {
    doc.pointer(path).ok_or(PatchError::NotFound)
}

fn parent_mut<'a>(
    doc: &'a mut Canonical,
    path: &[String],
) -> Result<(&'a mut Canonical, String), PatchError> {
    let (parent_path, key) = split_last(path).ok_or(PatchError::InvalidTarget)?;
    let key = key.to_string();
    let parent = doc.pointer_mut(parent_path).ok_or(PatchError::NotFound)?;
    Ok((parent, key))
}

fn apply_add(doc: &mut Canonical, path: &[String], value: Canonical) -> Result<(), PatchError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent, key) = parent_mut(doc, path)?;
    match parent {
        Canonical::Map(entries) | Canonical::Keyed(entries) => {
            entries.insert(key, value);
            Ok(())
        }
        Canonical::List(items) => {
            if key == "-" {
                items.push(value);
                return Ok(());
            }
            let idx = parse_index(&key).ok_or(PatchError::InvalidIndex)?;
            if idx > items.len() {
                return Err(PatchError::InvalidIndex);
            }
            items.insert(idx, value);
            Ok(())
        }
        Canonical::Scalar(_) => Err(PatchError::InvalidTarget),
    }
}

fn apply_remove(doc: &mut Canonical, path: &[String]) -> Result<Canonical, PatchError> {
    let (parent, key) = parent_mut(doc, path)?;
    match parent {
        Canonical::Map(entries) | Canonical::Keyed(entries) => {
            entries.shift_remove(&key).ok_or(PatchError::NotFound)
        }
        Canonical::List(items) => {
            let idx = parse_index(&key).ok_or(PatchError::InvalidIndex)?;
            if idx >= items.len() {
                return Err(PatchError::NotFound);
            }
            Ok(items.remove(idx))
        }
        Canonical::Scalar(_) => Err(PatchError::InvalidTarget),
    }
}

fn apply_replace(doc: &mut Canonical, path: &[String], value: Canonical) -> Result<(), PatchError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent, key) = parent_mut(doc, path)?;
    if matches!(parent, Canonical::Scalar(_)) {
        return Err(PatchError::InvalidTarget);
    }
    if let Canonical::List(_) = parent {
        parse_index(&key).ok_or(PatchError::InvalidIndex)?;
    }
    let slot = parent.get_mut(&key).ok_or(PatchError::NotFound)?;
    *slot = value;
    Ok(())
}

fn apply_copy(doc: &mut Canonical, path: &[String], from: &[String]) -> Result<(), PatchError> {
    let value = get_at(doc, from)?.clone();
    apply_add(doc, path, value)
}

fn apply_move(doc: &mut Canonical, path: &[String], from: &[String]) -> Result<(), PatchError> {
    if is_proper_prefix(from, path) {
        return Err(PatchError::InvalidTarget);
    }
    if from == path {
        return get_at(doc, from).map(|_| ());
    }
    let value = apply_remove(doc, from)?;
    apply_add(doc, path, value)
}

fn apply_test(doc: &Canonical, path: &[String], expected: &Canonical) -> Result<(), PatchError> {
    if get_at(doc, path)? == expected {
        Ok(())
    } else {
        Err(PatchError::Test)
    }
}

// ── Main apply functions ──────────────────────────────────────────────────

/// Apply a single operation to the document in place.
///
/// On error the document may be left half-modified only for `move`, whose
/// source is removed before the destination is checked; callers that need
/// atomicity go through [`apply_patch`].
pub fn apply_op(doc: &mut Canonical, op: &Op) -> Result<(), PatchError> {
    match op {
        Op::Add { path, value } => apply_add(doc, path, canonicalize(value.clone())),
        Op::Remove { path } => apply_remove(doc, path).map(|_| ()),
        Op::Replace { path, value } => apply_replace(doc, path, canonicalize(value.clone())),
        Op::Copy { path, from } => apply_copy(doc, path, from),
        Op::Move { path, from } => apply_move(doc, path, from),
        Op::Test { path, value } => apply_test(doc, path, &canonicalize(value.clone())),
    }
}

/// Apply `ops` in order to an owned working tree.
///
/// The first failing operation stops the patch; its index, the operation and
/// the reason are returned and the working tree is dropped.
pub fn apply_patch(doc: Canonical, ops: &[Op]) -> Result<Canonical, ApplyFailure> {
    let mut working = doc;
    for (index, op) in ops.iter().enumerate() {
        if let Err(reason) = apply_op(&mut working, op) {
            tracing::debug!(index, op = op.op_name(), %reason, "patch operation failed");
            return Err(ApplyFailure { index, operation: op.clone(), reason });
        }
    }
    tracing::debug!(ops = ops.len(), "patch applied");
    Ok(working)
}

// ── Tests ─────────────────────────────────────────────────────────────────
