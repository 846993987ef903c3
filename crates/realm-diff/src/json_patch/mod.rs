//! JSON Patch (RFC 6902) over canonical trees.
//!
//! # Operations
//!
//! `add`, `remove`, `replace`, `copy`, `move`, `test`. Paths are JSON
//! Pointers into the canonical tree, so collapsed arrays are addressed by
//! record id (`/clients/<id>/...`) and positional lists by index.

pub mod apply;
pub mod codec;
pub mod types;

pub use apply::{apply_op, apply_patch};
pub use codec::{from_json, from_json_patch, to_json, to_json_patch};
pub use types::{ApplyFailure, Op, PatchError};
