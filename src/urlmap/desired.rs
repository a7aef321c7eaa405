use k8s_openapi::api::networking::v1::Ingress;

use crate::{
    backend::BackendServicesMap,
    compute::{HostRule, PathMatcher, PathRule, UrlMap},
    error::ComputationError,
    namer::path_matcher_name,
    status::{LoadBalancerStatus, StatusError},
};

use super::routing::{ingress_to_routing_table, RoutingTable};

pub const URL_MAP_RESOURCE_KIND: &str = "URL map";

/// Inputs from which the desired url map of a load balancer is computed.
#[derive(Debug, Clone, Copy)]
pub struct DesiredUrlMapParams<'a> {
    /// Resource name given by the naming scheme.
    pub name: &'a str,
    pub lb_name: &'a str,
    pub ip_address: &'a str,
    pub clusters: &'a [String],
    pub ingress: &'a Ingress,
    pub backends: &'a BackendServicesMap,
}

/// Computes the url map `params` describe.
///
/// When only some backends resolve, the url map built from the resolved paths
/// comes back in [`ComputationError::PartialUrlMap`].
pub fn desired_url_map(params: DesiredUrlMapParams<'_>) -> Result<UrlMap, ComputationError> {
    let DesiredUrlMapParams {
        name,
        lb_name,
        ip_address,
        clusters,
        ingress,
        backends,
    } = params;

    let description =
        desired_status_string(lb_name, URL_MAP_RESOURCE_KIND, ip_address, clusters)?;

    match ingress_to_routing_table(ingress, backends) {
        Ok(table) => Ok(url_map_from_routing_table(name, description, &table)),
        Err(ComputationError::PartialRoutingTable { table, errors }) => {
            Err(ComputationError::PartialUrlMap {
                url_map: Box::new(url_map_from_routing_table(name, description, &table)),
                errors,
            })
        }
        Err(err) => Err(err),
    }
}

/// Status string stored as the description of a resource of `resource_kind`.
pub fn desired_status_string(
    lb_name: &str,
    resource_kind: &str,
    ip_address: &str,
    clusters: &[String],
) -> Result<String, StatusError> {
    LoadBalancerStatus::new(
        lb_name,
        format!(
            "{} for kubernetes multicluster loadbalancer {}",
            resource_kind, lb_name
        ),
        clusters,
        ip_address,
    )
    .encode()
}

/// One host rule and one path matcher per host of `table`, in host order.
///
/// A table without hosts leaves `host_rules` and `path_matchers` as `None`:
/// the API drops empty lists, and an empty `Some` would never compare equal
/// to what it returns.
pub fn url_map_from_routing_table(
    name: &str,
    description: String,
    table: &RoutingTable,
) -> UrlMap {
    let default_service = table.default_backend().self_link.clone();

    let (host_rules, path_matchers) = if table.is_empty() {
        (None, None)
    } else {
        let mut host_rules = Vec::with_capacity(table.len());
        let mut path_matchers = Vec::with_capacity(table.len());

        for (host, paths) in table.hosts() {
            let pm_name = path_matcher_name(host);

            host_rules.push(HostRule {
                hosts: vec![host.clone()],
                path_matcher: pm_name.clone(),
            });

            path_matchers.push(PathMatcher {
                name: pm_name,
                default_service: default_service.clone(),
                path_rules: paths
                    .iter()
                    .map(|(path, backend)| PathRule {
                        paths: vec![path.clone()],
                        service: backend.self_link.clone(),
                    })
                    .collect(),
            });
        }

        (Some(host_rules), Some(path_matchers))
    };

    UrlMap {
        name: name.to_string(),
        description,
        default_service,
        host_rules,
        path_matchers,
        ..Default::default()
    }
}
