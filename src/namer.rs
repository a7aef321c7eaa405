use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Every resource managed for a multicluster load balancer starts with this.
pub const MCI_PREFIX: &str = "mci1";

/// Path matchers are matched to host rules by name; this prefixes the host hash.
pub const HOST_RULE_PREFIX: &str = "host";

const MAX_NAME_LENGTH: usize = 63;

static RESOURCE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]([-a-z0-9]*[a-z0-9])?$").expect("valid resource name regex"));

#[derive(Debug, Error)]
pub enum NamerError {
    #[error("load balancer name must not be empty")]
    Empty,

    #[error("{name} is not a valid resource name")]
    InvalidName { name: String },
}

pub trait UrlMapNamer: Send + Sync {
    fn url_map_name(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct LoadBalancerNamer {
    lb_name: String,
}

impl LoadBalancerNamer {
    pub fn new(lb_name: &str) -> Result<Self, NamerError> {
        if lb_name.is_empty() {
            return Err(NamerError::Empty);
        }

        let namer = Self {
            lb_name: lb_name.to_lowercase(),
        };

        let name = namer.url_map_name();
        if !RESOURCE_NAME.is_match(&name) {
            return Err(NamerError::InvalidName { name });
        }

        Ok(namer)
    }

    pub fn lb_name(&self) -> &str {
        &self.lb_name
    }

    fn resource_name(&self, kind: &str) -> String {
        let name = format!("{}-{}-{}", MCI_PREFIX, kind, self.lb_name);

        truncate(&name).to_string()
    }
}

impl UrlMapNamer for LoadBalancerNamer {
    fn url_map_name(&self) -> String {
        self.resource_name("um")
    }
}

fn truncate(name: &str) -> &str {
    match name.char_indices().nth(MAX_NAME_LENGTH) {
        Some((end, _)) => name[..end].trim_end_matches('-'),
        None => name,
    }
}

/// Name of the path matcher serving `host`.
///
/// Hosts may contain characters that are not allowed in resource names (for
/// example `*.example.com`), so the name is derived from a hash of the host.
pub fn path_matcher_name(host: &str) -> String {
    let digest = Sha256::digest(host.as_bytes());

    let hash: String = digest[..16].iter().map(|b| format!("{:02x}", b)).collect();

    format!("{}{}", HOST_RULE_PREFIX, hash)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn url_map_name_has_mci_prefix() {
        let namer = LoadBalancerNamer::new("My-LB").unwrap();

        assert_eq!(namer.url_map_name(), "mci1-um-my-lb");
    }

    #[test]
    fn url_map_name_is_truncated_to_resource_name_limit() {
        let namer = LoadBalancerNamer::new(&"a".repeat(80)).unwrap();

        let name = namer.url_map_name();

        assert_eq!(name.len(), 63);
        assert!(name.starts_with("mci1-um-aaa"));
    }

    #[rstest]
    #[case::empty("")]
    #[case::underscore("my_lb")]
    #[case::dot("my.lb")]
    #[case::trailing_dash("lb-")]
    fn invalid_load_balancer_name(#[case] lb_name: &str) {
        assert!(LoadBalancerNamer::new(lb_name).is_err());
    }

    #[test]
    fn path_matcher_name_is_stable() {
        assert_eq!(
            path_matcher_name("foo.example.com"),
            path_matcher_name("foo.example.com")
        );
    }

    #[rstest]
    #[case("foo.example.com")]
    #[case("*.example.com")]
    #[case("*")]
    fn path_matcher_name_is_a_valid_resource_name(#[case] host: &str) {
        let name = path_matcher_name(host);

        assert_eq!(name.len(), HOST_RULE_PREFIX.len() + 32);
        assert!(RESOURCE_NAME.is_match(&name));
    }

    #[test]
    fn path_matcher_name_differs_per_host() {
        assert_ne!(
            path_matcher_name("foo.example.com"),
            path_matcher_name("bar.example.com")
        );
    }
}
