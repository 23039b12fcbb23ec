//! Provider profile fragments produced by the linking flow

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::influencer::Credentials;
use super::provider::Provider;

/// Which identifying fields an adapter is able to supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCapabilities {
    pub handle: bool,
    pub external_id: bool,
    pub display_name: bool,
}

/// Canonical profile data returned by one provider after authorization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfileFragment {
    pub provider: Provider,
    pub external_id: Option<String>,
    pub display_name: Option<String>,
    pub handle: Option<String>,
    /// Explicit profile link when the provider knows a better one than the
    /// handle-derived URL.
    pub link_url: Option<String>,
    pub credentials: Credentials,
    /// Provider-specific keys merged into the binding. A `null` value
    /// removes the key from the stored binding.
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
}

impl ProviderProfileFragment {
    /// Fragment carrying nothing but the credentials, used when the
    /// metadata lookup after a successful exchange fails.
    pub fn credentials_only(provider: Provider, credentials: Credentials) -> Self {
        Self {
            provider,
            external_id: None,
            display_name: None,
            handle: None,
            link_url: None,
            credentials,
            extra: BTreeMap::new(),
        }
    }

    /// Fields `capabilities` promises that this fragment left blank.
    pub fn missing_fields(&self, capabilities: ProfileCapabilities) -> Vec<&'static str> {
        let blank = |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());

        [
            (capabilities.handle, blank(&self.handle), "handle"),
            (capabilities.external_id, blank(&self.external_id), "externalId"),
            (capabilities.display_name, blank(&self.display_name), "displayName"),
        ]
        .into_iter()
        .filter(|(declared, missing, _)| *declared && *missing)
        .map(|(_, _, name)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials { access_token: "at".into(), refresh_token: None, expires_at: None, scope: None }
    }

    #[test]
    fn missing_fields_reports_only_declared_blanks() {
        let mut fragment = ProviderProfileFragment::credentials_only(Provider::Twitch, credentials());
        fragment.handle = Some("acme".into());
        fragment.display_name = Some("  ".into());

        let all = ProfileCapabilities { handle: true, external_id: true, display_name: true };
        assert_eq!(fragment.missing_fields(all), vec!["externalId", "displayName"]);

        let handle_only = ProfileCapabilities { handle: true, external_id: false, display_name: false };
        assert!(fragment.missing_fields(handle_only).is_empty());
    }
}
