//! Comparison of a desired url map against one returned by the API.
//!
//! Every field is compared explicitly. The destructuring patterns below are
//! exhaustive, so adding a field to one of the compute types does not compile
//! until it is handled here.

use std::fmt;

use crate::{
    compute::{HostRule, PathMatcher, PathRule, UrlMap},
    logger,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    pub path: String,
    pub desired: String,
    pub existing: String,
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: desired={} existing={}",
            self.path, self.desired, self.existing
        )
    }
}

/// Clears the fields that only the server populates.
pub fn clear_server_fields(um: &mut UrlMap) {
    um.creation_timestamp = None;
    um.kind = None;
    um.id = None;
    um.self_link = None;
    um.server_response = None;
}

/// Returns true if `existing` already is `desired`, ignoring server fields of `existing`.
pub fn url_map_matches(desired: &UrlMap, existing: &UrlMap) -> bool {
    let diffs = url_map_diff(desired, existing);

    if diffs.is_empty() {
        return true;
    }

    logger!(
        info,
        "url map {} differs from desired state:\n{}",
        desired.name,
        diffs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    );

    false
}

pub fn url_map_diff(desired: &UrlMap, existing: &UrlMap) -> Vec<FieldDiff> {
    let mut existing = existing.clone();
    clear_server_fields(&mut existing);

    logger!(debug, "desired url map: {:?}", desired);
    logger!(debug, "existing url map: {:?}", existing);

    let UrlMap {
        kind,
        id,
        creation_timestamp,
        name,
        description,
        self_link,
        default_service,
        host_rules,
        path_matchers,
        fingerprint,
        server_response,
    } = desired;

    let mut differ = Differ::default();

    differ.field("kind", kind, &existing.kind);
    differ.field("id", id, &existing.id);
    differ.field(
        "creationTimestamp",
        creation_timestamp,
        &existing.creation_timestamp,
    );
    differ.field("name", name, &existing.name);
    differ.field("description", description, &existing.description);
    differ.field("selfLink", self_link, &existing.self_link);
    differ.field("defaultService", default_service, &existing.default_service);
    differ.optional_list(
        "hostRules",
        host_rules,
        &existing.host_rules,
        Differ::host_rule,
    );
    differ.optional_list(
        "pathMatchers",
        path_matchers,
        &existing.path_matchers,
        Differ::path_matcher,
    );
    differ.field("fingerprint", fingerprint, &existing.fingerprint);
    differ.field("serverResponse", server_response, &existing.server_response);

    differ.diffs
}

#[derive(Default)]
struct Differ {
    diffs: Vec<FieldDiff>,
}

impl Differ {
    fn field<T>(&mut self, path: &str, desired: &T, existing: &T)
    where
        T: PartialEq + fmt::Debug + ?Sized,
    {
        if desired != existing {
            self.diffs.push(FieldDiff {
                path: path.to_string(),
                desired: format!("{:?}", desired),
                existing: format!("{:?}", existing),
            });
        }
    }

    fn optional_list<T>(
        &mut self,
        path: &str,
        desired: &Option<Vec<T>>,
        existing: &Option<Vec<T>>,
        item: fn(&mut Self, &str, &T, &T),
    ) {
        match (desired, existing) {
            (None, None) => {}
            (Some(desired), Some(existing)) => self.list(path, desired, existing, item),
            (desired, existing) => self.diffs.push(FieldDiff {
                path: path.to_string(),
                desired: presence(desired),
                existing: presence(existing),
            }),
        }
    }

    fn list<T>(&mut self, path: &str, desired: &[T], existing: &[T], item: fn(&mut Self, &str, &T, &T)) {
        if desired.len() != existing.len() {
            self.field(&format!("{}.len", path), &desired.len(), &existing.len());
        }

        for (i, (d, e)) in desired.iter().zip(existing).enumerate() {
            item(self, &format!("{}[{}]", path, i), d, e);
        }
    }

    fn host_rule(&mut self, path: &str, desired: &HostRule, existing: &HostRule) {
        let HostRule {
            hosts,
            path_matcher,
        } = desired;

        self.field(&format!("{}.hosts", path), hosts, &existing.hosts);
        self.field(
            &format!("{}.pathMatcher", path),
            path_matcher,
            &existing.path_matcher,
        );
    }

    fn path_matcher(&mut self, path: &str, desired: &PathMatcher, existing: &PathMatcher) {
        let PathMatcher {
            name,
            default_service,
            path_rules,
        } = desired;

        self.field(&format!("{}.name", path), name, &existing.name);
        self.field(
            &format!("{}.defaultService", path),
            default_service,
            &existing.default_service,
        );
        self.list(
            &format!("{}.pathRules", path),
            path_rules,
            &existing.path_rules,
            Self::path_rule,
        );
    }

    fn path_rule(&mut self, path: &str, desired: &PathRule, existing: &PathRule) {
        let PathRule { paths, service } = desired;

        self.field(&format!("{}.paths", path), paths, &existing.paths);
        self.field(&format!("{}.service", path), service, &existing.service);
    }
}

fn presence<T>(list: &Option<Vec<T>>) -> String {
    match list {
        None => "<nil>".to_string(),
        Some(items) => format!("<{} items>", items.len()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::compute::{ServerResponse, URL_MAP_KIND};

    use super::*;

    fn desired() -> UrlMap {
        UrlMap {
            name: "mci1-um-lb".into(),
            description: "status".into(),
            default_service: "be-svc0".into(),
            host_rules: Some(vec![HostRule {
                hosts: vec!["foo.example.com".into()],
                path_matcher: "host1".into(),
            }]),
            path_matchers: Some(vec![PathMatcher {
                name: "host1".into(),
                default_service: "be-svc0".into(),
                path_rules: vec![PathRule {
                    paths: vec!["/api".into()],
                    service: "be-svc1".into(),
                }],
            }]),
            fingerprint: Some("fp".into()),
            ..Default::default()
        }
    }

    fn existing() -> UrlMap {
        UrlMap {
            kind: Some(URL_MAP_KIND.into()),
            id: Some(42),
            creation_timestamp: Some("2017-10-01T00:00:00Z".into()),
            self_link: Some("https://example.com/urlMaps/mci1-um-lb".into()),
            server_response: Some(ServerResponse {
                http_status_code: 200,
                ..Default::default()
            }),
            ..desired()
        }
    }

    #[test]
    fn server_fields_are_ignored() {
        assert!(url_map_matches(&desired(), &existing()));
    }

    #[test]
    fn clear_server_fields_keeps_caller_fields() {
        let mut actual = existing();

        clear_server_fields(&mut actual);

        assert_eq!(actual, desired());
    }

    #[test]
    fn reports_nested_field() {
        let mut existing = existing();
        existing.path_matchers.as_mut().unwrap()[0].path_rules[0].service = "be-svc2".into();

        let actual = url_map_diff(&desired(), &existing);

        assert_eq!(
            actual,
            vec![FieldDiff {
                path: "pathMatchers[0].pathRules[0].service".into(),
                desired: r#""be-svc1""#.into(),
                existing: r#""be-svc2""#.into(),
            }]
        );
    }

    #[test]
    fn absent_and_empty_lists_differ() {
        let desired = UrlMap {
            host_rules: None,
            path_matchers: None,
            ..desired()
        };
        let existing = UrlMap {
            host_rules: Some(vec![]),
            path_matchers: None,
            ..existing()
        };

        let actual = url_map_diff(&desired, &existing);

        assert_eq!(
            actual,
            vec![FieldDiff {
                path: "hostRules".into(),
                desired: "<nil>".into(),
                existing: "<0 items>".into(),
            }]
        );
    }

    #[test]
    fn list_order_matters() {
        let two_hosts = |first: &str, second: &str| UrlMap {
            host_rules: Some(vec![
                HostRule {
                    hosts: vec![first.into()],
                    path_matcher: "host1".into(),
                },
                HostRule {
                    hosts: vec![second.into()],
                    path_matcher: "host1".into(),
                },
            ]),
            ..desired()
        };

        assert!(!url_map_matches(
            &two_hosts("a.example.com", "b.example.com"),
            &two_hosts("b.example.com", "a.example.com")
        ));
    }

    #[test]
    fn reports_length_mismatch() {
        let mut existing = existing();
        existing.path_matchers.as_mut().unwrap()[0]
            .path_rules
            .push(PathRule {
                paths: vec!["/web".into()],
                service: "be-svc2".into(),
            });

        let actual = url_map_diff(&desired(), &existing);

        assert_eq!(actual.len(), 1);
        assert_eq!(actual[0].path, "pathMatchers[0].pathRules.len");
    }

    #[test]
    fn fingerprint_is_compared() {
        let existing = UrlMap {
            fingerprint: Some("other".into()),
            ..existing()
        };

        assert!(!url_map_matches(&desired(), &existing));
    }
}
