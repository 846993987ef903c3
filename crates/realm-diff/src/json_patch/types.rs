//! Core types for the JSON Patch module.

use std::fmt;

use realm_diff_json_pointer::{format_json_pointer, Path};
use serde_json::Value;
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────

/// Why a single operation could not be applied (or decoded).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("NOT_FOUND")]
    NotFound,
    #[error("TEST_FAILED")]
    Test,
    #[error("INVALID_INDEX")]
    InvalidIndex,
    #[error("INVALID_TARGET")]
    InvalidTarget,
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

impl PatchError {
    /// Stable error code, without any detail payload.
    pub fn name(&self) -> &'static str {
        match self {
            PatchError::NotFound => "NOT_FOUND",
            PatchError::Test => "TEST_FAILED",
            PatchError::InvalidIndex => "INVALID_INDEX",
            PatchError::InvalidTarget => "INVALID_TARGET",
            PatchError::InvalidOp(_) => "INVALID_OP",
        }
    }
}

// ── Op enum ───────────────────────────────────────────────────────────────

/// An RFC 6902 operation addressed into a canonical tree.
///
/// Values are held in raw (decanonicalized) JSON form, exactly as they appear
/// in a patch file.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add { path: Path, value: Value },
    Remove { path: Path },
    Replace { path: Path, value: Value },
    Copy { path: Path, from: Path },
    Move { path: Path, from: Path },
    Test { path: Path, value: Value },
}

impl Op {
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Add { .. } => "add",
            Op::Remove { .. } => "remove",
            Op::Replace { .. } => "replace",
            Op::Copy { .. } => "copy",
            Op::Move { .. } => "move",
            Op::Test { .. } => "test",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Op::Add { path, .. }
            | Op::Remove { path }
            | Op::Replace { path, .. }
            | Op::Copy { path, .. }
            | Op::Move { path, .. }
            | Op::Test { path, .. } => path,
        }
    }

    /// Source path of `copy` / `move`.
    pub fn from(&self) -> Option<&Path> {
        match self {
            Op::Copy { from, .. } | Op::Move { from, .. } => Some(from),
            _ => None,
        }
    }

    pub fn is_predicate(&self) -> bool {
        matches!(self, Op::Test { .. })
    }
}

// ── Apply result ──────────────────────────────────────────────────────────

/// A patch that stopped at operation `index`.
///
/// The working document is discarded when this is returned; the failure is the
/// whole result.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyFailure {
    pub index: usize,
    pub operation: Op,
    pub reason: PatchError,
}

impl fmt::Display for ApplyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "patch operation {} ({} {:?}) failed: {}",
            self.index,
            self.operation.op_name(),
            format_json_pointer(self.operation.path()),
            self.reason
        )
    }
}

impl std::error::Error for ApplyFailure {}
