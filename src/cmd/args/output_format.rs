use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use strum::{Display, EnumString};

#[derive(Debug, Default, EnumString, Display, ValueEnum, Clone, Copy, PartialEq, Eq)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        let rendered = match self {
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Json => serde_json::to_string_pretty(value)? + "\n",
        };

        Ok(rendered)
    }
}
