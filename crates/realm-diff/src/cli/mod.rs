//! Core logic behind the `realm-diff` binary.
//!
//! Each mode reads its inputs from disk, runs the pipeline and returns the
//! raw JSON result; the binary only prints and picks exit codes.
//! - `diff`: invertible, noise-filtered diff of two exports
//! - `patch`: apply a patch file to an export
//! - `partial`: apply a patch file and keep only the touched records

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use thiserror::Error;

use crate::canonical::{canonicalize, decanonicalize};
use crate::config::{ConfigError, NoiseFilterConfig};
use crate::json_patch::{
    apply_patch, from_json_patch, to_json, to_json_patch, ApplyFailure, PatchError,
};
use crate::json_patch_diff::diff;
use crate::noise::filter_noise;
use crate::partial::extract_partial;

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed patch: {0}")]
    Patch(#[from] PatchError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
    #[error("{0}")]
    Apply(#[from] ApplyFailure),
}

// ── IO helpers ────────────────────────────────────────────────────────────

/// Read and parse one JSON document.
pub fn read_json(path: &Path) -> Result<Value, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-print with a four-space indent.
pub fn to_pretty_json(value: &Value) -> Result<String, CliError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Multi-line diagnostic for a patch that stopped part way.
pub fn apply_failure_report(failure: &ApplyFailure) -> Result<String, CliError> {
    Ok(format!(
        "error: patch operation {} failed: {}\nname: {}\nindex: {}\noperation:\n{}",
        failure.index,
        failure.reason,
        failure.reason.name(),
        failure.index,
        to_pretty_json(&to_json(&failure.operation))?
    ))
}

fn read_patch(path: &Path) -> Result<Vec<crate::json_patch::Op>, CliError> {
    let raw = read_json(path)?;
    Ok(from_json_patch(&raw)?)
}

// ── Modes ─────────────────────────────────────────────────────────────────

/// Invertible diff of two exports. `noise` of `None` keeps every field.
pub fn run_diff(
    file1: &Path,
    file2: &Path,
    noise: Option<&NoiseFilterConfig>,
) -> Result<Value, CliError> {
    let mut src = canonicalize(read_json(file1)?);
    let mut dst = canonicalize(read_json(file2)?);
    if let Some(config) = noise {
        filter_noise(&mut src, config);
        filter_noise(&mut dst, config);
    }
    let ops = diff(&src, &dst, true);
    tracing::info!(ops = ops.len(), "diff ready");
    Ok(to_json_patch(&ops))
}

/// Apply `patch` to `file` and return the full patched document.
pub fn run_patch(file: &Path, patch: &Path) -> Result<Value, CliError> {
    let doc = canonicalize(read_json(file)?);
    let ops = read_patch(patch)?;
    let patched = apply_patch(doc, &ops)?;
    tracing::info!(ops = ops.len(), "patch applied");
    Ok(decanonicalize(&patched))
}

/// Apply `patch` to `file` and return only the records it touched.
pub fn run_partial(file: &Path, patch: &Path) -> Result<Value, CliError> {
    let doc = canonicalize(read_json(file)?);
    let ops = read_patch(patch)?;
    let partial = extract_partial(&doc, &ops)?;
    tracing::info!(ops = ops.len(), "partial document ready");
    Ok(decanonicalize(&partial.into_canonical()))
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_json(dir: &tempfile::TempDir, name: &str, value: &Value) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(value.to_string().as_bytes()).unwrap();
        path
    }

    fn realm(redirect: &str) -> Value {
        json!({
            "id": "demo",
            "realm": "demo",
            "users": [{"id": "u1", "username": "alice"}],
            "clients": [
                {"id": "c0", "clientId": "security-admin-console"},
                {"id": "a", "clientId": "app", "redirectUris": [redirect]}
            ]
        })
    }

    #[test]
    fn pretty_json_uses_four_spaces() {
        let out = to_pretty_json(&json!({"a": [1]})).unwrap();
        assert_eq!(out, "{\n    \"a\": [\n        1\n    ]\n}");
    }

    #[test]
    fn diff_filters_noise_unless_kept() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_json(&dir, "a.json", &realm("http://x"));
        let b = write_json(&dir, "b.json", &realm("http://y"));

        let filtered = run_diff(&a, &b, Some(&NoiseFilterConfig::default())).unwrap();
        assert_eq!(filtered, json!([]));

        let raw = run_diff(&a, &b, None).unwrap();
        assert_eq!(
            raw,
            json!([
                {"op": "test", "path": "/clients/a/redirectUris", "value": ["http://x"]},
                {"op": "replace", "path": "/clients/a/redirectUris", "value": ["http://y"]}
            ])
        );
    }

    #[test]
    fn patch_applies_generated_diff() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_json(&dir, "a.json", &realm("http://x"));
        let b = write_json(&dir, "b.json", &realm("http://y"));
        let ops = run_diff(&a, &b, None).unwrap();
        let p = write_json(&dir, "a-b.patch.json", &ops);
        let out = run_patch(&a, &p).unwrap();
        assert_eq!(out, decanonicalize(&canonicalize(realm("http://y"))));
    }

    #[test]
    fn partial_keeps_touched_client() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_json(&dir, "a.json", &realm("http://x"));
        let p = write_json(
            &dir,
            "p.json",
            &json!([{"op": "replace", "path": "/clients/a/redirectUris", "value": ["http://z"]}]),
        );
        let out = run_partial(&a, &p).unwrap();
        assert_eq!(
            out["clients"],
            json!([{"id": "a", "clientId": "app", "redirectUris": ["http://z"]}])
        );
        assert_eq!(out["groups"], json!({}));
        assert!(out.get("users").is_none());
    }

    #[test]
    fn apply_failure_is_reported_with_operation() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_json(&dir, "a.json", &realm("http://x"));
        let p = write_json(
            &dir,
            "p.json",
            &json!([
                {"op": "add", "path": "/enabled", "value": true},
                {"op": "remove", "path": "/clients/missing"}
            ]),
        );
        for result in [run_patch(&a, &p), run_partial(&a, &p)] {
            let failure = match result {
                Err(CliError::Apply(failure)) => failure,
                other => panic!("expected apply failure, got {other:?}"),
            };
            assert_eq!(failure.index, 1);
            let report = apply_failure_report(&failure).unwrap();
            assert!(report.starts_with("error: patch operation 1 failed: NOT_FOUND\n"));
            assert!(report.contains("name: NOT_FOUND"));
            assert!(report.contains("\"path\": \"/clients/missing\""));
        }
    }

    #[test]
    fn input_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(read_json(&missing), Err(CliError::Io { .. })));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        let err = read_json(&bad).unwrap_err();
        assert!(matches!(err, CliError::Json { .. }));
        assert!(err.to_string().contains("bad.json"));

        let a = write_json(&dir, "a.json", &json!({}));
        let p = write_json(&dir, "p.json", &json!([{"op": "frobnicate", "path": "/x"}]));
        assert!(matches!(run_patch(&a, &p), Err(CliError::Patch(PatchError::InvalidOp(_)))));
    }
}
