//! Canonicalize / decanonicalize.

use serde_json::Value;

use super::order::{id_cmp, id_key, scalar_cmp};
use super::{Canonical, Entries, ID_FIELD};

/// How an array is represented once canonicalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayShape {
    /// Every element is an object with a usable `id`.
    Keyed,
    /// Every element is a scalar.
    ScalarSet,
    /// Anything else, including the empty array.
    Positional,
}

fn record_key(item: &Value) -> Option<String> {
    item.as_object()?.get(ID_FIELD).and_then(id_key)
}

fn classify(items: &[Value]) -> ArrayShape {
    if items.is_empty() {
        ArrayShape::Positional
    } else if items.iter().all(|item| record_key(item).is_some()) {
        ArrayShape::Keyed
    } else if items.iter().all(|item| !item.is_array() && !item.is_object()) {
        ArrayShape::ScalarSet
    } else {
        ArrayShape::Positional
    }
}

/// Converts a raw JSON tree into canonical form.
///
/// Arrays are classified one by one:
/// - all elements are records with a non-null scalar `id` → [`Canonical::Keyed`]
///   (a later duplicate id replaces the earlier record);
/// - all elements are scalars → a sorted [`Canonical::List`];
/// - otherwise → a positional [`Canonical::List`] of canonicalized elements.
pub fn canonicalize(value: Value) -> Canonical {
    match value {
        Value::Array(items) => canonicalize_array(items),
        Value::Object(map) => Canonical::Map(
            map.into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect(),
        ),
        scalar => Canonical::Scalar(scalar),
    }
}

fn canonicalize_array(items: Vec<Value>) -> Canonical {
    match classify(&items) {
        ArrayShape::Keyed => {
            let mut entries = Entries::with_capacity(items.len());
            for item in items {
                if let Some(key) = record_key(&item) {
                    entries.insert(key, canonicalize(item));
                }
            }
            Canonical::Keyed(entries)
        }
        ArrayShape::ScalarSet => {
            let mut scalars = items;
            scalars.sort_by(scalar_cmp);
            Canonical::List(scalars.into_iter().map(Canonical::Scalar).collect())
        }
        ArrayShape::Positional => Canonical::List(items.into_iter().map(canonicalize).collect()),
    }
}

/// Converts a canonical tree back into raw JSON.
///
/// Collapsed arrays come back ordered by [`id_cmp`] over each record's `id`,
/// not in their original input order.
pub fn decanonicalize(value: &Canonical) -> Value {
    match value {
        Canonical::Scalar(v) => v.clone(),
        Canonical::List(items) => Value::Array(items.iter().map(decanonicalize).collect()),
        Canonical::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), decanonicalize(value)))
                .collect(),
        ),
        Canonical::Keyed(entries) => {
            let mut records: Vec<&Canonical> = entries.values().collect();
            records.sort_by(|a, b| id_cmp(a.record_id(), b.record_id()));
            Value::Array(records.into_iter().map(decanonicalize).collect())
        }
    }
}
