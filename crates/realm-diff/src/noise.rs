//! Removal of environment-specific and high-churn fields before diffing.

use crate::canonical::Canonical;
use crate::config::NoiseFilterConfig;

const CLIENTS: &str = "clients";
const CLIENT_ID: &str = "clientId";

/// Strips noisy fields from a canonical realm document, in place.
///
/// Must run on canonical form: clients are found through the collapsed
/// `clients` mapping. Applying it twice is the same as applying it once.
pub fn filter_noise(tree: &mut Canonical, config: &NoiseFilterConfig) {
    let Canonical::Map(root) = tree else {
        return;
    };
    let before = root.len();
    root.retain(|key, _| !config.excluded_top_level_fields.contains(key));

    let mut dropped_clients = 0usize;
    if let Some(Canonical::Keyed(clients)) = root.get_mut(CLIENTS) {
        let total = clients.len();
        let reserved = config.reserved_client_id.as_str();
        clients.retain(|_, client| {
            client.scalar_field(CLIENT_ID).and_then(|v| v.as_str()) != Some(reserved)
        });
        dropped_clients = total - clients.len();
        for client in clients.values_mut() {
            if let Canonical::Map(fields) = client {
                fields.retain(|key, _| !config.excluded_client_fields.contains(key));
            }
        }
    }
    tracing::debug!(
        top_level_removed = before - root.len(),
        dropped_clients,
        "noise filtered"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{canonicalize, decanonicalize};
    use serde_json::json;

    fn filtered(v: serde_json::Value) -> serde_json::Value {
        let mut tree = canonicalize(v);
        filter_noise(&mut tree, &NoiseFilterConfig::default());
        decanonicalize(&tree)
    }

    #[test]
    fn strips_top_level_noise() {
        let out = filtered(json!({
            "realm": "demo",
            "users": [{"id": "u1"}],
            "eventsEnabled": true,
            "authenticationFlows": [{"id": "f1"}]
        }));
        assert_eq!(out, json!({"realm": "demo"}));
    }

    #[test]
    fn drops_reserved_client_and_client_urls() {
        let out = filtered(json!({
            "clients": [
                {"id": "c1", "clientId": "security-admin-console", "baseUrl": "/admin"},
                {
                    "id": "c2",
                    "clientId": "app",
                    "enabled": true,
                    "redirectUris": ["https://app.local/*"],
                    "baseUrl": "https://app.local",
                    "adminUrl": "https://app.local/admin",
                    "authorizationSettings": {"policies": []}
                }
            ]
        }));
        assert_eq!(out, json!({"clients": [{"id": "c2", "clientId": "app", "enabled": true}]}));
    }

    #[test]
    fn positional_clients_are_left_alone() {
        let raw = json!({"clients": [{"clientId": "security-admin-console", "baseUrl": "/"}]});
        assert_eq!(filtered(raw.clone()), raw);
    }

    #[test]
    fn non_map_roots_are_ignored() {
        let mut tree = canonicalize(json!([{"id": "users"}]));
        let before = tree.clone();
        filter_noise(&mut tree, &NoiseFilterConfig::default());
        assert_eq!(tree, before);
    }

    #[test]
    fn idempotent() {
        let mut tree = canonicalize(json!({
            "users": [],
            "clients": [
                {"id": "c1", "clientId": "security-admin-console"},
                {"id": "c2", "clientId": "x", "adminUrl": "u"},
                {"id": "c3", "clientId": 12}
            ]
        }));
        let config = NoiseFilterConfig::default();
        filter_noise(&mut tree, &config);
        let once = tree.clone();
        filter_noise(&mut tree, &config);
        assert_eq!(tree, once);
    }

    #[test]
    fn custom_config() {
        let config = NoiseFilterConfig::from_toml_str(
            r#"
            excluded_top_level_fields = ["smtpServer"]
            reserved_client_id = "admin-cli"
            excluded_client_fields = ["secret"]
            "#,
        )
        .unwrap();
        let mut tree = canonicalize(json!({
            "users": [],
            "smtpServer": {},
            "clients": [
                {"id": "a", "clientId": "admin-cli"},
                {"id": "b", "clientId": "security-admin-console", "secret": "s", "baseUrl": "/"}
            ]
        }));
        filter_noise(&mut tree, &config);
        assert_eq!(
            decanonicalize(&tree),
            json!({
                "users": [],
                "clients": [{"id": "b", "clientId": "security-admin-console", "baseUrl": "/"}]
            })
        );
    }
}
