use strum::Display;
use thiserror::Error as TError;

use crate::{compute::UrlMap, status::StatusError, urlmap::routing::RoutingTable};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Remote call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Get,
    Create,
    Update,
    Delete,
    List,
}

/// Errors returned by a [`crate::urlmap::UrlMapProvider`].
#[derive(Debug, TError)]
pub enum ProviderError {
    #[error("url map {name} not found")]
    NotFound { name: String },

    #[error("url map {name} was modified concurrently: fingerprint mismatch")]
    Conflict { name: String },

    #[error(transparent)]
    Api(#[from] anyhow::Error),
}

impl ProviderError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[derive(Debug, TError)]
pub enum BackendError {
    #[error("ingress backend for path {path} does not reference a service")]
    NoService { path: String },

    #[error("no backend service found for service: {service}, must have been an error in ensuring backend services")]
    NotFound { service: String },
}

/// Per-entry backend resolution failures collected while building a routing table.
#[derive(Debug, Default)]
pub struct BackendErrors(Vec<BackendError>);

impl BackendErrors {
    pub fn push(&mut self, err: BackendError) {
        self.0.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendError> {
        self.0.iter()
    }
}

impl std::fmt::Display for BackendErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.as_slice() {
            [err] => write!(f, "1 error occurred: {}", err),
            errs => {
                write!(f, "{} errors occurred:", errs.len())?;
                for err in errs {
                    write!(f, "\n\t* {}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for BackendErrors {}

#[derive(Debug, TError)]
pub enum ComputationError {
    #[error("ingress has no default backend: multicluster ingress needs a user specified default backend")]
    MissingDefaultBackend,

    #[error("default backend: {0}")]
    DefaultBackend(#[source] BackendError),

    /// Some paths could not be resolved. `table` holds everything that was.
    #[error("{errors}")]
    PartialRoutingTable {
        table: Box<RoutingTable>,
        errors: BackendErrors,
    },

    /// The url map assembled from a partial routing table.
    #[error("{errors}")]
    PartialUrlMap {
        url_map: Box<UrlMap>,
        errors: BackendErrors,
    },

    #[error("unexpected error in converting status to string: {0}")]
    Status(#[from] StatusError),
}

#[derive(Debug, TError)]
pub enum Error {
    /// Not wrapped so callers can tell "no load balancer" apart from other failures.
    #[error("url map {name} not found")]
    NotFound { name: String },

    #[error("error in computing desired url map: {0}")]
    Computation(#[from] ComputationError),

    #[error("will not overwrite differing url map {name} without --force")]
    ConflictWithoutForce { name: String },

    #[error("error in {operation} url map {name}: {source}")]
    Remote {
        operation: Operation,
        name: String,
        #[source]
        source: ProviderError,
    },

    #[error("error in parsing url map {name} description: {source}")]
    Decode {
        name: String,
        #[source]
        source: StatusError,
    },
}

impl Error {
    pub fn from_provider(operation: Operation, name: impl Into<String>, err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound { name } => Self::NotFound { name },
            source => Self::Remote {
                operation,
                name: name.into(),
                source,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
