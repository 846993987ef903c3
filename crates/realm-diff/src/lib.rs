//! realm-diff: order-insensitive diff, patch and partial export of identity
//! realm configuration documents.
//!
//! Pipeline: raw JSON → [`canonical`] → optional [`noise`] filter →
//! [`json_patch_diff`] / [`json_patch`] / [`partial`] → back to raw JSON.

// Data model
pub mod canonical;
pub mod config;
pub mod noise;

// Patch engine
pub mod json_patch;
pub mod json_patch_diff;
pub mod partial;

// Binary support
pub mod cli;
pub mod logging;
