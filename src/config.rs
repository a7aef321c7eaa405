use std::path::PathBuf;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub enum ConfigLoadOption {
    #[default]
    Default,

    Path(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("urlmap-sync.log"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// YAML file backing the local url map store.
    pub state_file: PathBuf,

    /// Project used when building self links.
    pub project: String,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("urlmaps.yaml"),
            project: "default-project".to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn load(option: ConfigLoadOption) -> Result<Self> {
        let figment = Figment::new();

        let config = match option {
            ConfigLoadOption::Default => figment.merge(Serialized::defaults(Self::default())),
            ConfigLoadOption::Path(path) => figment
                .merge(Serialized::defaults(Self::default()))
                .merge(Yaml::file(path)),
        }
        .merge(Env::prefixed("URLMAP_SYNC_").split("__"))
        .extract_lossy()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            indoc! {
                "
                state_file: /var/lib/urlmap-sync/urlmaps.yaml
                logging:
                  enabled: true
                "
            }
            .as_bytes(),
        )
        .unwrap();

        let actual = Config::load(ConfigLoadOption::Path(file.path().to_path_buf())).unwrap();

        assert_eq!(
            actual.state_file,
            PathBuf::from("/var/lib/urlmap-sync/urlmaps.yaml")
        );
        assert_eq!(actual.project, "default-project");
        assert_eq!(
            actual.logging,
            LoggingConfig {
                enabled: true,
                path: PathBuf::from("urlmap-sync.log"),
            }
        );
    }
}
