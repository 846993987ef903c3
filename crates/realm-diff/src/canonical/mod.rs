//! Canonical (order-insensitive) representation of realm documents.
//!
//! A raw export stores most collections as arrays of records carrying an `id`
//! field. Two exports of the same realm routinely list those records in
//! different orders, which makes positional diffs useless. Canonicalization
//! collapses such arrays into mappings keyed by id ([`Canonical::Keyed`]), so
//! that a structural diff only sees records appearing, disappearing or
//! changing.
//!
//! The collapsed state is carried by the enum variant itself. A record field
//! can therefore never be mistaken for a marker, whatever it is named.

use indexmap::IndexMap;
use realm_diff_json_pointer::parse_index;
use serde_json::Value;

pub mod order;
mod transform;

pub use order::{id_cmp, id_key, scalar_cmp};
pub use transform::{canonicalize, decanonicalize};

/// Field identifying a record inside a collapsible array.
pub const ID_FIELD: &str = "id";

/// Insertion-ordered entries of a mapping.
pub type Entries = IndexMap<String, Canonical>;

/// A canonicalized JSON value.
#[derive(Debug, Clone)]
pub enum Canonical {
    /// `null`, a boolean, a number or a string. Never an array or object.
    Scalar(Value),
    /// An array kept in sequence form: a sorted scalar set, or records that
    /// cannot be keyed.
    List(Vec<Canonical>),
    /// A genuine JSON object.
    Map(Entries),
    /// A collapsed array of records, keyed by each record's id.
    Keyed(Entries),
}

/// Structural equality. Mapping order is ignored, and an empty collapsed
/// array equals an empty list since both decanonicalize to `[]`.
impl PartialEq for Canonical {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Canonical::Scalar(a), Canonical::Scalar(b)) => a == b,
            (Canonical::List(a), Canonical::List(b)) => a == b,
            (Canonical::Map(a), Canonical::Map(b)) => a == b,
            (Canonical::Keyed(a), Canonical::Keyed(b)) => a == b,
            (Canonical::Keyed(k), Canonical::List(l))
            | (Canonical::List(l), Canonical::Keyed(k)) => k.is_empty() && l.is_empty(),
            _ => false,
        }
    }
}

impl Canonical {
    /// Short name of the variant, used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Canonical::Scalar(_) => "scalar",
            Canonical::List(_) => "list",
            Canonical::Map(_) => "map",
            Canonical::Keyed(_) => "keyed",
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Canonical::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Entries of a `Map` or `Keyed` value.
    pub fn entries(&self) -> Option<&Entries> {
        match self {
            Canonical::Map(entries) | Canonical::Keyed(entries) => Some(entries),
            _ => None,
        }
    }

    /// A non-empty list made only of scalars, i.e. a canonicalized scalar
    /// array. Its positions carry no meaning.
    pub fn is_scalar_set(&self) -> bool {
        match self {
            Canonical::List(items) => {
                !items.is_empty() && items.iter().all(|item| matches!(item, Canonical::Scalar(_)))
            }
            _ => false,
        }
    }

    /// Child addressed by one pointer step.
    pub fn get(&self, step: &str) -> Option<&Canonical> {
        match self {
            Canonical::Map(entries) | Canonical::Keyed(entries) => entries.get(step),
            Canonical::List(items) => parse_index(step).and_then(|i| items.get(i)),
            Canonical::Scalar(_) => None,
        }
    }

    pub fn get_mut(&mut self, step: &str) -> Option<&mut Canonical> {
        match self {
            Canonical::Map(entries) | Canonical::Keyed(entries) => entries.get_mut(step),
            Canonical::List(items) => parse_index(step).and_then(move |i| items.get_mut(i)),
            Canonical::Scalar(_) => None,
        }
    }

    /// Value at `path`; the empty path is `self`.
    pub fn pointer(&self, path: &[String]) -> Option<&Canonical> {
        path.iter().try_fold(self, |node, step| node.get(step))
    }

    pub fn pointer_mut(&mut self, path: &[String]) -> Option<&mut Canonical> {
        path.iter().try_fold(self, |node, step| node.get_mut(step))
    }

    /// Scalar field of a `Map`, e.g. a client's `clientId`.
    pub fn scalar_field(&self, name: &str) -> Option<&Value> {
        match self {
            Canonical::Map(entries) => entries.get(name).and_then(Canonical::as_scalar),
            _ => None,
        }
    }

    /// The record's `id`, if this is a mapping with a scalar id.
    pub fn record_id(&self) -> Option<&Value> {
        self.scalar_field(ID_FIELD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(steps: &[&str]) -> Vec<String> {
        steps.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pointer_walks_keyed_and_list() {
        let doc = canonicalize(json!({
            "clients": [{"id": "c1", "webOrigins": ["b", "a"]}],
            "attrs": [{"k": 1}, {"k": 2}]
        }));
        assert_eq!(
            doc.pointer(&path(&["clients", "c1", "webOrigins", "0"])),
            Some(&Canonical::Scalar(json!("a")))
        );
        assert_eq!(
            doc.pointer(&path(&["attrs", "1", "k"])),
            Some(&Canonical::Scalar(json!(2)))
        );
        assert_eq!(doc.pointer(&path(&["attrs", "01"])), None);
        assert_eq!(doc.pointer(&[]), Some(&doc));
    }

    #[test]
    fn mapping_equality_ignores_order() {
        let a = canonicalize(json!({"x": 1, "y": [{"id": "p"}, {"id": "q"}]}));
        let b = canonicalize(json!({"y": [{"id": "q"}, {"id": "p"}], "x": 1}));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_keyed_equals_empty_list() {
        assert_eq!(Canonical::Keyed(Entries::new()), Canonical::List(vec![]));
        assert_ne!(Canonical::Map(Entries::new()), Canonical::List(vec![]));
        let mut one = Entries::new();
        one.insert("a".into(), Canonical::Scalar(Value::Null));
        assert_ne!(Canonical::Keyed(one), Canonical::List(vec![]));
    }

    #[test]
    fn record_id_reads_scalar_ids_only() {
        let rec = canonicalize(json!({"id": "r1", "name": "x"}));
        assert_eq!(rec.record_id(), Some(&json!("r1")));
        assert_eq!(canonicalize(json!({"name": "x"})).record_id(), None);
        assert_eq!(canonicalize(json!("r1")).record_id(), None);
    }

    #[test]
    fn scalar_set_detection() {
        assert!(canonicalize(json!(["b", "a"])).is_scalar_set());
        assert!(!canonicalize(json!([])).is_scalar_set());
        assert!(!canonicalize(json!([{"k": 1}])).is_scalar_set());
    }
}
