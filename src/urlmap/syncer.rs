use k8s_openapi::api::networking::v1::Ingress;

use crate::{
    backend::BackendServicesMap,
    compute::UrlMap,
    error::{Error, Operation, ProviderError, Result},
    logger,
    namer::{UrlMapNamer, MCI_PREFIX},
    status::{self, LoadBalancerStatus},
};

use super::{
    desired::{desired_url_map, DesiredUrlMapParams},
    diff::url_map_matches,
    UrlMapProvider,
};

/// Manages the url map of a multicluster load balancer.
///
/// Nothing is cached between calls: every operation fetches the current url
/// map first. Callers must serialize operations on the same load balancer.
pub struct UrlMapSyncer<N, P> {
    namer: N,
    provider: P,
}

impl<N, P> UrlMapSyncer<N, P>
where
    N: UrlMapNamer,
    P: UrlMapProvider,
{
    pub fn new(namer: N, provider: P) -> Self {
        Self { namer, provider }
    }

    /// Makes the url map match `ingress` and returns its self link.
    ///
    /// An existing url map that differs is only overwritten when
    /// `force_update` is set.
    pub async fn ensure_url_map(
        &self,
        lb_name: &str,
        ip_address: &str,
        clusters: &[String],
        ingress: &Ingress,
        backends: &BackendServicesMap,
        force_update: bool,
    ) -> Result<String> {
        logger!(info, "Ensuring url map for load balancer {}", lb_name);

        let name = self.namer.url_map_name();

        let mut desired = desired_url_map(DesiredUrlMapParams {
            name: &name,
            lb_name,
            ip_address,
            clusters,
            ingress,
            backends,
        })
        .inspect_err(|err| logger!(error, "Error computing desired url map {}: {}", name, err))?;

        let existing = match self.provider.get_url_map(&name).await {
            Ok(existing) => existing,
            Err(ProviderError::NotFound { .. }) => {
                logger!(info, "url map {} does not exist. Creating it", name);
                return self.create_url_map(&desired).await;
            }
            Err(err) => return Err(Error::from_provider(Operation::Get, &name, err)),
        };

        logger!(
            info,
            "url map {} exists already. Checking if it matches the desired url map",
            name
        );
        logger!(
            debug,
            "Existing url map: {:?}\nDesired url map: {:?}",
            existing,
            desired
        );

        // The API rejects updates without the current fingerprint.
        desired.fingerprint.clone_from(&existing.fingerprint);

        if url_map_matches(&desired, &existing) {
            logger!(info, "Desired url map {} exists already", name);
            return self_link(&name, &existing);
        }

        if force_update {
            return self.update_url_map(&desired).await;
        }

        logger!(
            warn,
            "Will not overwrite differing url map {} without force",
            name
        );

        Err(Error::ConflictWithoutForce { name })
    }

    /// Deletes the url map. A url map that does not exist counts as deleted.
    pub async fn delete_url_map(&self) -> Result<()> {
        let name = self.namer.url_map_name();

        logger!(info, "Deleting url map {}", name);

        match self.provider.delete_url_map(&name).await {
            Ok(()) => {
                logger!(info, "url map {} deleted successfully", name);
                Ok(())
            }
            Err(ProviderError::NotFound { .. }) => {
                logger!(info, "url map {} does not exist. Nothing to delete", name);
                Ok(())
            }
            Err(err) => {
                logger!(error, "Error deleting url map {}: {}", name, err);
                Err(Error::from_provider(Operation::Delete, &name, err))
            }
        }
    }

    /// Status recorded on the url map.
    ///
    /// Returns [`Error::NotFound`] if there is no url map, and [`Error::Decode`]
    /// if its description is not a status.
    pub async fn get_load_balancer_status(&self) -> Result<LoadBalancerStatus> {
        let name = self.namer.url_map_name();

        let url_map = self
            .provider
            .get_url_map(&name)
            .await
            .map_err(|err| Error::from_provider(Operation::Get, &name, err))?;

        decode_status(&url_map)
    }

    /// Statuses of all multicluster load balancers.
    ///
    /// Url maps whose description is not a status are skipped.
    pub async fn list_load_balancer_statuses(&self) -> Result<Vec<LoadBalancerStatus>> {
        list_load_balancer_statuses(&self.provider).await
    }

    /// Removes `clusters` from the status recorded on the url map.
    ///
    /// Always overwrites the url map: this is an explicit operator action.
    pub async fn remove_clusters_from_status(&self, clusters: &[String]) -> Result<()> {
        let name = self.namer.url_map_name();

        logger!(info, "Removing clusters {:?} from url map {}", clusters, name);

        let existing = self
            .provider
            .get_url_map(&name)
            .await
            .map_err(|err| Error::from_provider(Operation::Get, &name, err))?;

        let description =
            status::remove_clusters(&existing.description, clusters).map_err(|source| {
                Error::Decode {
                    name: name.clone(),
                    source,
                }
            })?;

        let desired = UrlMap {
            description,
            ..existing
        };

        self.update_url_map(&desired).await.map(|_| ())
    }

    async fn create_url_map(&self, desired: &UrlMap) -> Result<String> {
        let name = &desired.name;

        logger!(debug, "Creating url map {:?}", desired);

        self.provider
            .create_url_map(desired)
            .await
            .map_err(|err| Error::from_provider(Operation::Create, name, err))?;

        logger!(info, "url map {} created successfully", name);

        self.fetch_self_link(name).await
    }

    async fn update_url_map(&self, desired: &UrlMap) -> Result<String> {
        let name = &desired.name;

        logger!(info, "Updating existing url map {} to match the desired state", name);

        self.provider
            .update_url_map(desired)
            .await
            .map_err(|err| Error::from_provider(Operation::Update, name, err))?;

        logger!(info, "url map {} updated successfully", name);

        self.fetch_self_link(name).await
    }

    async fn fetch_self_link(&self, name: &str) -> Result<String> {
        let url_map = self
            .provider
            .get_url_map(name)
            .await
            .map_err(|err| Error::from_provider(Operation::Get, name, err))?;

        self_link(name, &url_map)
    }
}

/// Statuses recorded on every url map named with [`MCI_PREFIX`].
///
/// Listing does not depend on a particular load balancer, so it is available
/// without a namer.
pub async fn list_load_balancer_statuses<P>(provider: &P) -> Result<Vec<LoadBalancerStatus>>
where
    P: UrlMapProvider + ?Sized,
{
    let url_maps = provider.list_url_maps().await.map_err(|err| {
        logger!(error, "Error listing url maps: {}", err);
        Error::from_provider(Operation::List, "*", err)
    })?;

    logger!(debug, "url maps: {:?}", url_maps);

    let statuses = url_maps
        .iter()
        .filter(|um| um.name.starts_with(MCI_PREFIX))
        .filter_map(|um| match decode_status(um) {
            Ok(status) => Some(status),
            Err(err) => {
                logger!(
                    warn,
                    "Ignoring url map {} without a load balancer status: {}",
                    um.name,
                    err
                );
                None
            }
        })
        .collect();

    Ok(statuses)
}

fn self_link(name: &str, url_map: &UrlMap) -> Result<String> {
    url_map.self_link.clone().ok_or_else(|| Error::Remote {
        operation: Operation::Get,
        name: name.to_string(),
        source: anyhow::anyhow!("response has no selfLink").into(),
    })
}

fn decode_status(url_map: &UrlMap) -> Result<LoadBalancerStatus> {
    LoadBalancerStatus::decode(&url_map.description).map_err(|source| Error::Decode {
        name: url_map.name.clone(),
        source,
    })
}
