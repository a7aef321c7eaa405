use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{anyhow, Context as _};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

use crate::{
    compute::{ServerResponse, UrlMap, URL_MAP_KIND},
    error::ProviderError,
    logger,
};

use super::{diff::clear_server_fields, UrlMapProvider};

const COMPUTE_BASE_URL: &str = "https://www.googleapis.com/compute/v1";

/// [`UrlMapProvider`] persisting url maps as a YAML list in a local file.
///
/// Behaves like the remote API where this crate depends on it: server fields
/// are assigned on create, updates must carry the current fingerprint, and
/// unknown names are reported as not found.
pub struct FileUrlMapStore {
    path: PathBuf,
    project: String,
    lock: Mutex<()>,
}

impl FileUrlMapStore {
    pub fn new(path: impl Into<PathBuf>, project: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            project: project.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn self_link(&self, name: &str) -> String {
        format!(
            "{}/projects/{}/global/urlMaps/{}",
            COMPUTE_BASE_URL, self.project, name
        )
    }

    fn load(&self) -> anyhow::Result<Vec<UrlMap>> {
        if !self.path.try_exists()? {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    fn save(&self, url_maps: &[UrlMap]) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(url_maps)?;

        std::fs::write(&self.path, content)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    /// Runs `f` on the stored url maps, saving them if `f` succeeds and returns `true`.
    fn transaction<T>(
        &self,
        f: impl FnOnce(&mut Vec<UrlMap>) -> Result<(T, bool), ProviderError>,
    ) -> Result<T, ProviderError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("url map store lock is poisoned"))?;

        let mut url_maps = self.load()?;

        let (ret, modified) = f(&mut url_maps)?;

        if modified {
            self.save(&url_maps)?;
        }

        Ok(ret)
    }
}

fn fingerprint(url_map: &UrlMap) -> Result<String, ProviderError> {
    let mut content = url_map.clone();
    clear_server_fields(&mut content);
    content.fingerprint = None;

    let json = serde_json::to_vec(&content).map_err(anyhow::Error::from)?;
    let digest = Sha256::digest(&json);

    Ok(STANDARD.encode(&digest[..8]))
}

fn with_response(mut url_map: UrlMap) -> UrlMap {
    url_map.server_response = Some(ServerResponse {
        http_status_code: 200,
        ..Default::default()
    });
    url_map
}

#[async_trait]
impl UrlMapProvider for FileUrlMapStore {
    async fn get_url_map(&self, name: &str) -> Result<UrlMap, ProviderError> {
        self.transaction(|url_maps| {
            let url_map = url_maps
                .iter()
                .find(|um| um.name == name)
                .cloned()
                .ok_or_else(|| ProviderError::not_found(name))?;

            Ok((with_response(url_map), false))
        })
    }

    async fn create_url_map(&self, url_map: &UrlMap) -> Result<(), ProviderError> {
        self.transaction(|url_maps| {
            if url_maps.iter().any(|um| um.name == url_map.name) {
                return Err(anyhow!("url map {} already exists", url_map.name).into());
            }

            let mut created = url_map.clone();
            clear_server_fields(&mut created);

            created.kind = Some(URL_MAP_KIND.to_string());
            created.id = Some(url_maps.iter().filter_map(|um| um.id).max().unwrap_or(0) + 1);
            created.creation_timestamp = Some(chrono::Utc::now().to_rfc3339());
            created.self_link = Some(self.self_link(&created.name));
            created.fingerprint = Some(fingerprint(&created)?);

            logger!(debug, "store: created url map {:?}", created);

            url_maps.push(created);

            Ok(((), true))
        })
    }

    async fn update_url_map(&self, url_map: &UrlMap) -> Result<(), ProviderError> {
        self.transaction(|url_maps| {
            let stored = url_maps
                .iter_mut()
                .find(|um| um.name == url_map.name)
                .ok_or_else(|| ProviderError::not_found(&url_map.name))?;

            if stored.fingerprint != url_map.fingerprint {
                return Err(ProviderError::Conflict {
                    name: url_map.name.clone(),
                });
            }

            let mut updated = url_map.clone();
            updated.kind = stored.kind.take();
            updated.id = stored.id;
            updated.creation_timestamp = stored.creation_timestamp.take();
            updated.self_link = stored.self_link.take();
            updated.server_response = None;
            updated.fingerprint = Some(fingerprint(&updated)?);

            logger!(debug, "store: updated url map {:?}", updated);

            *stored = updated;

            Ok(((), true))
        })
    }

    async fn list_url_maps(&self) -> Result<Vec<UrlMap>, ProviderError> {
        self.transaction(|url_maps| {
            Ok((url_maps.drain(..).map(with_response).collect(), false))
        })
    }

    async fn delete_url_map(&self, name: &str) -> Result<(), ProviderError> {
        self.transaction(|url_maps| {
            let before = url_maps.len();
            url_maps.retain(|um| um.name != name);

            if url_maps.len() == before {
                return Err(ProviderError::not_found(name));
            }

            Ok(((), true))
        })
    }
}
