use std::{collections::BTreeMap, path::Path};

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

/// Handle to a provisioned backend service.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendService {
    pub name: String,
    pub self_link: String,
}

/// Kubernetes service name -> backend service.
pub type BackendServicesMap = BTreeMap<String, BackendService>;

pub fn load_backend_services(path: &Path) -> Result<BackendServicesMap> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read backend services file {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse backend services file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn load_backend_services_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            indoc! {
                "
                svc0:
                  name: be-svc0
                  selfLink: https://example.com/backendServices/be-svc0
                svc1:
                  name: be-svc1
                  selfLink: https://example.com/backendServices/be-svc1
                "
            }
            .as_bytes(),
        )
        .unwrap();

        let actual = load_backend_services(file.path()).unwrap();

        assert_eq!(actual.len(), 2);
        assert_eq!(
            actual["svc1"],
            BackendService {
                name: "be-svc1".into(),
                self_link: "https://example.com/backendServices/be-svc1".into(),
            }
        );
    }

    #[test]
    fn load_backend_services_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_backend_services(&dir.path().join("missing.yaml")).unwrap_err();

        assert!(err.to_string().contains("failed to read backend services file"));
    }
}
