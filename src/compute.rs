//! Wire shapes of the compute URL map API.
//!
//! Only the fields this crate reads or writes are modelled. Fields marked as
//! server-populated are assigned by the remote API and are cleared before any
//! desired/existing comparison (see [`crate::urlmap::diff`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const URL_MAP_KIND: &str = "compute#urlMap";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlMap {
    /// Server-populated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Server-populated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Server-populated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Server-populated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,

    #[serde(default)]
    pub default_service: String,

    /// `None` and `Some(vec![])` are distinct on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_rules: Option<Vec<HostRule>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_matchers: Option<Vec<PathMatcher>>,

    /// Optimistic-concurrency token. Must be echoed back on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// Server-populated, never persisted.
    #[serde(skip)]
    pub server_response: Option<ServerResponse>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRule {
    pub hosts: Vec<String>,
    pub path_matcher: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathMatcher {
    pub name: String,
    pub default_service: String,
    #[serde(default)]
    pub path_rules: Vec<PathRule>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathRule {
    pub paths: Vec<String>,
    pub service: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServerResponse {
    pub http_status_code: u16,
    pub header: BTreeMap<String, Vec<String>>,
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn absent_host_rules_are_not_serialized() {
        let um = UrlMap {
            name: "mci1-um-lb".into(),
            description: "desc".into(),
            default_service: "svc0".into(),
            ..Default::default()
        };

        let actual = serde_yaml::to_string(&um).unwrap();

        let expected = indoc! {
            "
            name: mci1-um-lb
            description: desc
            defaultService: svc0
            "
        };

        assert_eq!(actual, expected);
    }

    #[test]
    fn empty_host_rules_stay_present() {
        let um: UrlMap = serde_yaml::from_str(indoc! {
            "
            name: mci1-um-lb
            defaultService: svc0
            hostRules: []
            pathMatchers: []
            selfLink: https://example.com/urlMaps/mci1-um-lb
            "
        })
        .unwrap();

        assert_eq!(um.host_rules, Some(vec![]));
        assert_eq!(um.path_matchers, Some(vec![]));
        assert_eq!(
            um.self_link.as_deref(),
            Some("https://example.com/urlMaps/mci1-um-lb")
        );
    }
}
