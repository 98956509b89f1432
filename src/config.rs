use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::cli::CliArgs;
use crate::search::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_OFFSET_SECONDS, Search};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Config {
    pub version: u32,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub max_offset_seconds: u64,
    pub parallel: bool,
    pub batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            search: SearchConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_offset_seconds: DEFAULT_MAX_OFFSET_SECONDS,
            parallel: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

pub fn get_default_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "hashwish")
        .context("Failed to determine project directories")?;

    let config_dir = proj_dirs.config_dir();
    Ok(config_dir.join("hashwish.toml"))
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p,
            None => get_default_config_path()?,
        };

        if !path.exists() {
            let default_config = Config::default();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .context("Failed to create config directory")?;
            }
            default_config.save(&path)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    pub fn from_cli_and_file(cli_args: &CliArgs, config_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load(config_path)?;

        // CLI args override config file
        if let Some(max_offset) = cli_args.max_offset {
            config.search.max_offset_seconds = max_offset;
        }
        if cli_args.parallel {
            config.search.parallel = true;
        }

        Ok(config)
    }

    pub fn search(&self) -> Search {
        Search::new(self.search.max_offset_seconds)
            .with_parallel(self.search.parallel)
            .with_batch_size(self.search.batch_size)
    }
}
