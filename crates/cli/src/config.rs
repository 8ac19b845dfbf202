use anyhow::{anyhow, Context as AnyhowContext, Result};
use log::debug;
use repolink_git::GitProviderConfig;
use repolink_resolver::ResolverConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "REPOLINK_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "repolink.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub resolver: ResolverConfig,
    pub git: GitProviderConfig,
}

impl AppConfig {
    /// Explicit path, then `$REPOLINK_CONFIG`, then `./repolink.toml` when it
    /// exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => env::var_os(CONFIG_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .or_else(|| {
                    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                    local.is_file().then_some(local)
                }),
        };

        let config = match path {
            Some(path) => {
                let bytes = fs::read(&path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                debug!("loaded config from {}", path.display());
                Self::parse(&bytes)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Accepts JSON or TOML.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        match serde_json::from_slice(bytes) {
            Ok(config) => Ok(config),
            Err(json_err) => {
                let utf8 =
                    std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
                toml::from_str(utf8).map_err(|toml_err| {
                    anyhow!("Config is not valid JSON ({json_err}) or TOML ({toml_err})")
                })
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.resolver.validate()?;
        self.git.validate()?;
        Ok(())
    }
}
