use std::path::Path;

use anyhow::Context;
use maat::ConverterConfig;
use serde::Deserialize;

use crate::cli::InputArgs;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// Settings shared by every command. Flags given on the command line win
/// over values from the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub strict: bool,
    pub select: String,
    pub format: Format,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strict: false,
            select: "ab".to_string(),
            format: Format::Text,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        let Some(path) = path else {
            return Ok(Config::default());
        };

        let txt = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Config::from_json(&txt).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_json(txt: &str) -> anyhow::Result<Config> {
        let jd = &mut serde_json::Deserializer::from_str(txt);
        let config: Config = serde_path_to_error::deserialize(jd)?;
        Ok(config)
    }

    pub fn apply(&mut self, input: &InputArgs) {
        self.strict |= input.strict;
        if let Some(select) = &input.select {
            self.select = select.clone();
        }
    }

    pub fn converter_config(&self) -> ConverterConfig {
        ConverterConfig {
            strict: self.strict,
        }
    }
}
