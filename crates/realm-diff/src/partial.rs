//! Minimal importable document from a patch.
//!
//! The downstream import merges category by category and only understands
//! groups, client scopes, clients, default client scopes and roles. Rather
//! than diffing that schema, the extractor replays the *paths* a patch
//! touches: a touched record is copied whole from the patched tree, and its
//! untouched siblings are left out.

use indexmap::IndexMap;

use crate::canonical::{Canonical, Entries};
use crate::json_patch::{apply_patch, ApplyFailure, Op};

const ID: &str = "id";
const REALM: &str = "realm";
const GROUPS: &str = "groups";
const CLIENT_SCOPES: &str = "clientScopes";
const CLIENTS: &str = "clients";
const DEFAULT_CLIENT_SCOPES: &str = "defaultDefaultClientScopes";
const ROLES: &str = "roles";
const CLIENT: &str = "client";

/// Records copied into one category of the partial document.
///
/// A container only becomes a collapsed array once something has been
/// replayed into it; an untouched container stays an empty mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    pub entries: Entries,
    pub marked: bool,
}

impl Container {
    /// Mirror one record of the patched tree: copy it, or drop it if the patch
    /// removed it.
    fn sync(&mut self, key: &str, patched: Option<&Canonical>) {
        self.marked = true;
        match patched {
            Some(record) => {
                self.entries.insert(key.to_string(), record.clone());
            }
            None => {
                self.entries.shift_remove(key);
            }
        }
    }

    /// Mirror a whole category.
    fn sync_all(&mut self, patched: Option<&Canonical>) {
        self.marked = true;
        self.entries = match patched {
            Some(Canonical::Keyed(entries)) | Some(Canonical::Map(entries)) => entries.clone(),
            Some(Canonical::List(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), item.clone()))
                .collect(),
            Some(Canonical::Scalar(_)) | None => Entries::new(),
        };
    }

    pub fn into_canonical(self) -> Canonical {
        if self.marked {
            Canonical::Keyed(self.entries)
        } else {
            Canonical::Map(self.entries)
        }
    }
}

/// The restricted document produced by [`extract_partial`], still in
/// canonical form.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialDocument {
    pub id: Option<Canonical>,
    pub realm: Option<Canonical>,
    pub groups: Container,
    pub client_scopes: Container,
    pub clients: Container,
    pub default_default_client_scopes: Canonical,
    pub realm_roles: Container,
    /// Role containers keyed by the client name used under `roles.client`.
    pub client_roles: IndexMap<String, Container>,
}

impl PartialDocument {
    fn seeded_from(source: &Canonical) -> Self {
        Self {
            id: source.get(ID).cloned(),
            realm: source.get(REALM).cloned(),
            groups: Container::default(),
            client_scopes: Container::default(),
            clients: Container::default(),
            default_default_client_scopes: Canonical::List(Vec::new()),
            realm_roles: Container::default(),
            client_roles: IndexMap::new(),
        }
    }

    fn category_mut(&mut self, name: &str) -> Option<&mut Container> {
        match name {
            GROUPS => Some(&mut self.groups),
            CLIENT_SCOPES => Some(&mut self.client_scopes),
            CLIENTS => Some(&mut self.clients),
            _ => None,
        }
    }

    fn replay(&mut self, patched: &Canonical, path: &[String]) {
        let Some((first, rest)) = path.split_first() else {
            tracing::debug!("ignoring root-level operation in partial export");
            return;
        };
        match first.as_str() {
            GROUPS | CLIENT_SCOPES | CLIENTS => {
                let category = patched.get(first);
                if let Some(container) = self.category_mut(first) {
                    match rest.first() {
                        Some(key) => container.sync(key, category.and_then(|c| c.get(key))),
                        None => container.sync_all(category),
                    }
                }
            }
            DEFAULT_CLIENT_SCOPES => {
                self.default_default_client_scopes = patched
                    .get(DEFAULT_CLIENT_SCOPES)
                    .cloned()
                    .unwrap_or_else(|| Canonical::List(Vec::new()));
            }
            ROLES => self.replay_roles(patched.get(ROLES), rest),
            other => {
                tracing::debug!(
                    category = other,
                    "ignoring unsupported category in partial export"
                );
            }
        }
    }

    fn replay_roles(&mut self, roles: Option<&Canonical>, path: &[String]) {
        let realm_roles = roles.and_then(|r| r.get(REALM));
        let client_roles = roles.and_then(|r| r.get(CLIENT));
        match path.split_first() {
            None => {
                self.realm_roles.sync_all(realm_roles);
                self.replay_all_client_roles(client_roles);
            }
            Some((kind, rest)) if kind == REALM => match rest.first() {
                Some(key) => self.realm_roles.sync(key, realm_roles.and_then(|r| r.get(key))),
                None => self.realm_roles.sync_all(realm_roles),
            },
            Some((kind, rest)) if kind == CLIENT => {
                let Some((client, rest)) = rest.split_first() else {
                    self.replay_all_client_roles(client_roles);
                    return;
                };
                let Some(patched) = client_roles.and_then(|c| c.get(client)) else {
                    tracing::debug!(
                        client = client.as_str(),
                        "client roles gone after patch, skipping"
                    );
                    return;
                };
                let container = self.client_roles.entry(client.clone()).or_default();
                match rest.first() {
                    Some(key) => container.sync(key, patched.get(key)),
                    None => container.sync_all(Some(patched)),
                }
            }
            Some((other, _)) => {
                tracing::debug!(
                    kind = other.as_str(),
                    "ignoring unsupported role kind in partial export"
                );
            }
        }
    }

    fn replay_all_client_roles(&mut self, client_roles: Option<&Canonical>) {
        if let Some(entries) = client_roles.and_then(Canonical::entries) {
            for (client, roles) in entries {
                self.client_roles
                    .entry(client.clone())
                    .or_default()
                    .sync_all(Some(roles));
            }
        }
    }

    /// Canonical tree of the partial document, ready for decanonicalization.
    pub fn into_canonical(self) -> Canonical {
        let mut root = Entries::new();
        if let Some(id) = self.id {
            root.insert(ID.into(), id);
        }
        if let Some(realm) = self.realm {
            root.insert(REALM.into(), realm);
        }
        root.insert(GROUPS.into(), self.groups.into_canonical());
        root.insert(CLIENT_SCOPES.into(), self.client_scopes.into_canonical());
        root.insert(CLIENTS.into(), self.clients.into_canonical());
        root.insert(DEFAULT_CLIENT_SCOPES.into(), self.default_default_client_scopes);

        let client_roles = self
            .client_roles
            .into_iter()
            .map(|(client, container)| (client, container.into_canonical()))
            .collect();
        let mut roles = Entries::new();
        roles.insert(REALM.into(), self.realm_roles.into_canonical());
        roles.insert(CLIENT.into(), Canonical::Map(client_roles));
        root.insert(ROLES.into(), Canonical::Map(roles));
        Canonical::Map(root)
    }
}

/// Apply `ops` to `source`, then rebuild the subset of allow-listed
/// categories the patch touched.
///
/// A patch that fails to apply aborts the extraction with the same failure
/// the applier reports.
pub fn extract_partial(source: &Canonical, ops: &[Op]) -> Result<PartialDocument, ApplyFailure> {
    let patched = apply_patch(source.clone(), ops)?;
    let mut partial = PartialDocument::seeded_from(source);
    for op in ops.iter().filter(|op| !op.is_predicate()) {
        partial.replay(&patched, op.path());
    }
    tracing::debug!(
        ops = ops.len(),
        groups = partial.groups.entries.len(),
        client_scopes = partial.client_scopes.entries.len(),
        clients = partial.clients.entries.len(),
        realm_roles = partial.realm_roles.entries.len(),
        client_role_sets = partial.client_roles.len(),
        "partial document extracted"
    );
    Ok(partial)
}
