//! JSON Patch diff: generate a patch from two canonical trees.
//!
//! Collapsed arrays diff like objects (by record id), so reordering records
//! produces no operations. Sorted scalar sets are replaced as a unit because
//! their indices carry no meaning.

use realm_diff_json_pointer::Path;

use crate::canonical::{decanonicalize, Canonical, Entries};
use crate::json_patch::types::Op;

// ── Public API ────────────────────────────────────────────────────────────

/// Generate the operations that transform `src` into `dst`.
///
/// With `invertible`, every `remove` and `replace` is preceded by a `test`
/// asserting the value being dropped, so the patch refuses to apply to a
/// document that has drifted from `src`.
pub fn diff(src: &Canonical, dst: &Canonical, invertible: bool) -> Vec<Op> {
    let mut differ = Differ { ops: Vec::new(), invertible };
    differ.diff_at(&mut Vec::new(), src, dst);
    tracing::debug!(ops = differ.ops.len(), invertible, "diff computed");
    differ.ops
}

// ── Core recursive differ ─────────────────────────────────────────────────

struct Differ {
    ops: Vec<Op>,
    invertible: bool,
}

impl Differ {
    fn diff_at(&mut self, path: &mut Path, src: &Canonical, dst: &Canonical) {
        if src == dst {
            return;
        }
        match (src, dst) {
            (Canonical::Map(s), Canonical::Map(d)) | (Canonical::Keyed(s), Canonical::Keyed(d)) => {
                self.diff_entries(path, s, d)
            }
            (Canonical::List(s), Canonical::List(d))
                if !src.is_scalar_set() && !dst.is_scalar_set() =>
            {
                self.diff_list(path, s, d)
            }
            _ => self.replace(path, src, dst),
        }
    }

    fn diff_entries(&mut self, path: &mut Path, src: &Entries, dst: &Entries) {
        for (key, old) in src {
            if !dst.contains_key(key) {
                path.push(key.clone());
                self.remove(path, old);
                path.pop();
            }
        }
        for (key, new) in dst {
            path.push(key.clone());
            match src.get(key) {
                Some(old) => self.diff_at(path, old, new),
                None => self.ops.push(Op::Add { path: path.clone(), value: decanonicalize(new) }),
            }
            path.pop();
        }
    }

    fn diff_list(&mut self, path: &mut Path, src: &[Canonical], dst: &[Canonical]) {
        let common = src.len().min(dst.len());
        for i in 0..common {
            path.push(i.to_string());
            self.diff_at(path, &src[i], &dst[i]);
            path.pop();
        }
        for i in (common..src.len()).rev() {
            path.push(i.to_string());
            self.remove(path, &src[i]);
            path.pop();
        }
        for (i, new) in dst.iter().enumerate().skip(common) {
            path.push(i.to_string());
            self.ops.push(Op::Add { path: path.clone(), value: decanonicalize(new) });
            path.pop();
        }
    }

    fn test(&mut self, path: &Path, old: &Canonical) {
        if self.invertible {
            self.ops.push(Op::Test { path: path.clone(), value: decanonicalize(old) });
        }
    }

    fn remove(&mut self, path: &Path, old: &Canonical) {
        self.test(path, old);
        self.ops.push(Op::Remove { path: path.clone() });
    }

    fn replace(&mut self, path: &Path, old: &Canonical, new: &Canonical) {
        tracing::trace!(from = old.kind(), to = new.kind(), "replacing value");
        self.test(path, old);
        self.ops.push(Op::Replace { path: path.clone(), value: decanonicalize(new) });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
