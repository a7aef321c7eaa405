//! Load balancer status record stored in a resource's description field.
//!
//! The routing resource has no notion of cluster membership, so the set of
//! clusters behind a load balancer is kept here as JSON. Cluster lists are
//! always sorted and de-duplicated so that the encoded form is stable across
//! reconciliations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("failed to encode load balancer status: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode load balancer status: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("load balancer status has no load balancer name")]
    MissingLoadBalancerName,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoadBalancerStatus {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub load_balancer_name: String,

    #[serde(default)]
    pub clusters: Vec<String>,

    #[serde(rename = "IPAddress", default)]
    pub ip_address: String,
}

impl LoadBalancerStatus {
    pub fn new(
        load_balancer_name: impl Into<String>,
        description: impl Into<String>,
        clusters: &[String],
        ip_address: impl Into<String>,
    ) -> Self {
        let mut status = Self {
            description: description.into(),
            load_balancer_name: load_balancer_name.into(),
            clusters: clusters.to_vec(),
            ip_address: ip_address.into(),
        };
        status.normalize();
        status
    }

    fn normalize(&mut self) {
        self.clusters.sort();
        self.clusters.dedup();
    }

    pub fn encode(&self) -> Result<String, StatusError> {
        let mut normalized = self.clone();
        normalized.normalize();

        serde_json::to_string(&normalized).map_err(StatusError::Encode)
    }

    pub fn decode(s: &str) -> Result<Self, StatusError> {
        let mut status: Self = serde_json::from_str(s).map_err(StatusError::Malformed)?;

        if status.load_balancer_name.is_empty() {
            return Err(StatusError::MissingLoadBalancerName);
        }

        status.normalize();

        Ok(status)
    }

    pub fn remove_clusters(&mut self, to_remove: &[String]) {
        self.clusters.retain(|c| !to_remove.contains(c));
    }
}

/// Decodes `encoded`, drops `to_remove` from its membership and re-encodes it.
pub fn remove_clusters(encoded: &str, to_remove: &[String]) -> Result<String, StatusError> {
    let mut status = LoadBalancerStatus::decode(encoded)?;
    status.remove_clusters(to_remove);
    status.encode()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn clusters(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn status(names: &[&str]) -> LoadBalancerStatus {
        LoadBalancerStatus {
            description: "URL map for kubernetes multicluster loadbalancer lb".into(),
            load_balancer_name: "lb".into(),
            clusters: clusters(names),
            ip_address: "1.2.3.4".into(),
        }
    }

    #[test]
    fn encode_uses_pascal_case_keys() {
        let actual = status(&["b", "a"]).encode().unwrap();

        assert_eq!(
            actual,
            r#"{"Description":"URL map for kubernetes multicluster loadbalancer lb","LoadBalancerName":"lb","Clusters":["a","b"],"IPAddress":"1.2.3.4"}"#
        );
    }

    #[test]
    fn decode_returns_sorted_clusters() {
        let encoded = status(&["zone-c", "zone-a", "zone-b"]).encode().unwrap();

        let actual = LoadBalancerStatus::decode(&encoded).unwrap();

        assert_eq!(actual, status(&["zone-a", "zone-b", "zone-c"]));
    }

    #[test]
    fn encode_is_independent_of_cluster_order() {
        let a = status(&["c", "a", "b"]).encode().unwrap();
        let b = status(&["b", "c", "a", "a"]).encode().unwrap();

        assert_eq!(a, b);
    }

    #[rstest]
    #[case::not_json("URL map for kubernetes multicluster loadbalancer lb")]
    #[case::empty("")]
    #[case::wrong_type(r#"{"LoadBalancerName":1}"#)]
    fn decode_rejects_malformed_input(#[case] input: &str) {
        assert!(matches!(
            LoadBalancerStatus::decode(input),
            Err(StatusError::Malformed(_))
        ));
    }

    #[test]
    fn decode_rejects_missing_load_balancer_name() {
        assert!(matches!(
            LoadBalancerStatus::decode(r#"{"Description":"d","Clusters":["a"]}"#),
            Err(StatusError::MissingLoadBalancerName)
        ));
    }

    #[rstest]
    #[case::member(&["a", "b", "c"], &["b"], &["a", "c"])]
    #[case::non_member(&["a", "b"], &["z"], &["a", "b"])]
    #[case::all(&["a", "b"], &["b", "a"], &[])]
    fn remove_clusters_is_a_set_difference(
        #[case] existing: &[&str],
        #[case] to_remove: &[&str],
        #[case] expected: &[&str],
    ) {
        let encoded = status(existing).encode().unwrap();

        let actual = remove_clusters(&encoded, &clusters(to_remove)).unwrap();

        assert_eq!(
            LoadBalancerStatus::decode(&actual).unwrap().clusters,
            clusters(expected)
        );
    }

    #[test]
    fn remove_clusters_propagates_decode_error() {
        assert!(remove_clusters("not a status", &clusters(&["a"])).is_err());
    }
}
