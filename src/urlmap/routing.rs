use std::collections::BTreeMap;

use k8s_openapi::api::networking::v1::{Ingress, IngressBackend};

use crate::{
    backend::{BackendService, BackendServicesMap},
    error::{BackendError, BackendErrors, ComputationError},
    logger,
};

/// Host key used for rules that do not specify a host.
pub const DEFAULT_HOST: &str = "*";

/// Path key used for paths that are empty. Ingress treats them as catch-all.
pub const DEFAULT_PATH: &str = "/*";

pub type PathBackends = BTreeMap<String, BackendService>;

/// host -> path -> backend service, plus the backend for everything else.
///
/// Hosts and paths iterate in lexical order, which keeps the url map built
/// from a table identical between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    hosts: BTreeMap<String, PathBackends>,
    default_backend: BackendService,
}

impl RoutingTable {
    pub fn new(default_backend: BackendService) -> Self {
        Self {
            hosts: BTreeMap::new(),
            default_backend,
        }
    }

    /// Routes `host` + `path` to `backend`, replacing any earlier backend for the same pair.
    pub fn put(&mut self, host: &str, path: &str, backend: BackendService) {
        self.hosts
            .entry(host.to_string())
            .or_default()
            .insert(path.to_string(), backend);
    }

    pub fn default_backend(&self) -> &BackendService {
        &self.default_backend
    }

    pub fn hosts(&self) -> impl Iterator<Item = (&String, &PathBackends)> {
        self.hosts.iter()
    }

    pub fn get(&self, host: &str) -> Option<&PathBackends> {
        self.hosts.get(host)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// Converts the rules of `ing` into a [`RoutingTable`].
///
/// Paths whose backend can not be resolved are skipped and reported together
/// as [`ComputationError::PartialRoutingTable`], which still carries the table
/// built from everything else. A missing or unresolvable default backend
/// aborts the conversion.
pub fn ingress_to_routing_table(
    ing: &Ingress,
    backends: &BackendServicesMap,
) -> Result<RoutingTable, ComputationError> {
    let spec = ing.spec.as_ref();

    let mut hosts: BTreeMap<String, PathBackends> = BTreeMap::new();
    let mut errors = BackendErrors::default();

    for rule in spec.and_then(|spec| spec.rules.as_ref()).into_iter().flatten() {
        let Some(http) = &rule.http else {
            logger!(info, "Ignoring non http ingress rule {:?}", rule);
            continue;
        };

        let host = match rule.host.as_deref() {
            None | Some("") => DEFAULT_HOST,
            Some(host) => host,
        };

        // A host with no resolvable paths still gets a path matcher that
        // sends everything to the default backend.
        let paths = hosts.entry(host.to_string()).or_default();

        for p in &http.paths {
            let path = match p.path.as_deref() {
                None | Some("") => DEFAULT_PATH,
                Some(path) => path,
            };

            match resolve_backend(&p.backend, path, backends) {
                Ok(backend) => {
                    paths.insert(path.to_string(), backend.clone());
                }
                Err(err) => {
                    logger!(warn, "Skipping path {} of host {}: {}", path, host, err);
                    errors.push(err);
                }
            }
        }
    }

    let Some(default_backend) = spec.and_then(|spec| spec.default_backend.as_ref()) else {
        if !errors.is_empty() {
            logger!(warn, "{}", errors);
        }
        return Err(ComputationError::MissingDefaultBackend);
    };

    let default_backend = resolve_backend(default_backend, DEFAULT_PATH, backends)
        .map_err(ComputationError::DefaultBackend)?;

    let table = RoutingTable {
        hosts,
        default_backend: default_backend.clone(),
    };

    if errors.is_empty() {
        Ok(table)
    } else {
        Err(ComputationError::PartialRoutingTable {
            table: Box::new(table),
            errors,
        })
    }
}

fn resolve_backend<'a>(
    backend: &IngressBackend,
    path: &str,
    backends: &'a BackendServicesMap,
) -> Result<&'a BackendService, BackendError> {
    let Some(service) = &backend.service else {
        return Err(BackendError::NoService {
            path: path.to_string(),
        });
    };

    backends
        .get(&service.name)
        .ok_or_else(|| BackendError::NotFound {
            service: service.name.clone(),
        })
}
