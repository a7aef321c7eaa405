use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, ConfigLoadOption};

use super::SubCommand;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None, disable_help_subcommand = true)]
pub struct Command {
    /// Config file path
    #[arg(long, global = true, display_order = 1000)]
    pub config_file: Option<PathBuf>,

    /// Url map state file. Overrides `state_file` of the config file
    #[arg(long, global = true, display_order = 1000)]
    pub state_file: Option<PathBuf>,

    /// Logging
    #[arg(short = 'l', long, global = true, display_order = 1000)]
    pub logging: bool,

    #[command(subcommand)]
    pub subcommand: SubCommand,
}

impl Command {
    pub fn init() -> Self {
        Self::parse()
    }

    /// Applies the command line overrides to `config`.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(state_file) = &self.state_file {
            config.state_file = state_file.clone();
        }

        if self.logging {
            config.logging.enabled = true;
        }

        config
    }

    pub fn config_load_option(&self) -> Result<ConfigLoadOption> {
        let option = if let Some(path) = &self.config_file {
            match path.try_exists() {
                Ok(true) => ConfigLoadOption::Path(path.clone()),
                Ok(false) => {
                    eprintln!("Config file not found: {:?}", path);

                    ConfigLoadOption::Default
                }
                Err(err) => {
                    eprintln!("Failed to check config file exists: {}", err);

                    ConfigLoadOption::Default
                }
            }
        } else {
            let Some(path) = xdg_config_home().map(|dir| dir.join("config.yaml")) else {
                return Ok(ConfigLoadOption::Default);
            };

            match path.try_exists() {
                Ok(true) => ConfigLoadOption::Path(path),
                Ok(false) => ConfigLoadOption::Default,
                Err(err) => {
                    eprintln!("Failed to check config file exists: {}", err);

                    ConfigLoadOption::Default
                }
            }
        };

        Ok(option)
    }
}

fn xdg_config_home() -> Option<PathBuf> {
    match std::env::var_os("XDG_CONFIG_HOME").map(|s| PathBuf::from(s).join("urlmap-sync")) {
        Some(path) => Some(path),
        None => dirs::home_dir().map(|home| home.join(".config").join("urlmap-sync")),
    }
}
