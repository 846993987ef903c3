//! JSON Pointer (RFC 6901) helpers for realm-diff patch paths.
//!
//! Patch operations address canonical trees by pointer. Collapsed arrays are
//! addressed by record id rather than position, so a pointer such as
//! `/clients/a1b2/redirectUris` names the `redirectUris` field of the client
//! whose `id` is `a1b2`.
//!
//! # Example
//!
//! ```
//! use realm_diff_json_pointer::{format_json_pointer, parse_json_pointer};
//!
//! let path = parse_json_pointer("/roles/client/my~1app").unwrap();
//! assert_eq!(path, vec!["roles", "client", "my/app"]);
//! assert_eq!(format_json_pointer(&path), "/roles/client/my~1app");
//! ```

use thiserror::Error;

/// One unescaped reference token.
pub type PathStep = String;

/// A parsed pointer. The empty path addresses the document root.
pub type Path = Vec<PathStep>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonPointerError {
    #[error("json pointer must be empty or start with '/': {0:?}")]
    NotAbsolute(String),
}

/// Unescapes one reference token (`~1` → `/`, then `~0` → `~`).
///
/// ```
/// use realm_diff_json_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~1b"), "a/b");
/// assert_eq!(unescape_component("~01"), "~1");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes one reference token (`~` → `~0`, then `/` → `~1`).
pub fn escape_component(component: &str) -> String {
    if !component.contains(['/', '~']) {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Parses an absolute pointer into unescaped steps.
///
/// - `""` → `[]` (root)
/// - `"/"` → `[""]`
/// - `"/a~1b/0"` → `["a/b", "0"]`
pub fn parse_json_pointer(pointer: &str) -> Result<Path, JsonPointerError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    if !pointer.starts_with('/') {
        return Err(JsonPointerError::NotAbsolute(pointer.to_string()));
    }
    Ok(pointer.split('/').skip(1).map(unescape_component).collect())
}

/// Formats steps back into a pointer. The root formats as `""`.
pub fn format_json_pointer(path: &[String]) -> String {
    let mut out = String::with_capacity(path.iter().map(|s| s.len() + 1).sum());
    for step in path {
        out.push('/');
        out.push_str(&escape_component(step));
    }
    out
}

/// Parses an array index step.
///
/// Only canonical decimal integers are accepted: no sign, no leading zeros
/// (except `"0"` itself). The append marker `-` is not an index.
///
/// ```
/// use realm_diff_json_pointer::parse_index;
///
/// assert_eq!(parse_index("0"), Some(0));
/// assert_eq!(parse_index("12"), Some(12));
/// assert_eq!(parse_index("012"), None);
/// assert_eq!(parse_index("-"), None);
/// ```
pub fn parse_index(step: &str) -> Option<usize> {
    let bytes = step.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    step.parse().ok()
}

/// Returns `true` when `parent` is a strict ancestor of `child`.
pub fn is_proper_prefix(parent: &[String], child: &[String]) -> bool {
    parent.len() < child.len() && child[..parent.len()] == *parent
}

/// Splits a non-root path into its parent path and last step.
pub fn split_last(path: &[String]) -> Option<(&[String], &str)> {
    path.split_last()
        .map(|(last, parent)| (parent, last.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(steps: &[&str]) -> Path {
        steps.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn escape_order_matters() {
        assert_eq!(escape_component("~/"), "~0~1");
        assert_eq!(unescape_component("~0~1"), "~/");
        assert_eq!(unescape_component("~01"), "~1");
    }

    #[test]
    fn relative_pointer_is_rejected() {
        assert_eq!(
            parse_json_pointer("groups/g1"),
            Err(JsonPointerError::NotAbsolute("groups/g1".into()))
        );
    }

    #[test]
    fn proper_prefix() {
        assert!(is_proper_prefix(&p(&["a"]), &p(&["a", "b"])));
        assert!(is_proper_prefix(&p(&[]), &p(&["a"])));
        assert!(!is_proper_prefix(&p(&["a"]), &p(&["a"])));
        assert!(!is_proper_prefix(&p(&["a", "b"]), &p(&["a"])));
        assert!(!is_proper_prefix(&p(&["b"]), &p(&["a", "b"])));
    }

    #[test]
    fn split_last_of_root_is_none() {
        assert_eq!(split_last(&[]), None);
        let path = p(&["clients", "c1"]);
        let (parent, last) = split_last(&path).unwrap();
        assert_eq!(parent, &p(&["clients"])[..]);
        assert_eq!(last, "c1");
    }
}
