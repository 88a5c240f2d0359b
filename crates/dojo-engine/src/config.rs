use anyhow::{Context, Result};
use dojo_common::config::{ChallengeConfig, GeneralConfig, PointsConfig};
use dojo_common::rank::{default_ladder, RankDefinition, RankLadder};
use dojo_db::DatabaseConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default = "default_database_config")]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub points: PointsConfig,

    #[serde(default = "default_ladder")]
    pub ranks: Vec<RankDefinition>,

    #[serde(default)]
    pub challenges: ChallengeConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            database: default_database_config(),
            points: PointsConfig::default(),
            ranks: default_ladder(),
            challenges: ChallengeConfig::default(),
        }
    }
}

fn default_database_config() -> DatabaseConfig {
    let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("/tmp")).join("dojo");

    DatabaseConfig { path: data_dir.join("dojo.db").to_string_lossy().to_string(), ..Default::default() }
}

impl EngineConfig {
    /// Default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from("/tmp")).join("dojo").join("engine.toml")
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        debug!("Loading engine configuration from {:?}", config_path);

        if !config_path.exists() {
            info!(
                "Configuration file not found at {:?}, creating default configuration",
                config_path
            );
            let default_config = Self::default();
            default_config.save_to_path(config_path)?;
            return Ok(default_config);
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: EngineConfig = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        config.validate()?;

        info!("Loaded engine configuration from {:?}", config_path);
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        debug!("Saving engine configuration to {:?}", config_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let config_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Saved engine configuration to {:?}", config_path);
        Ok(())
    }

    /// Validate the configuration settings
    pub fn validate(&self) -> Result<()> {
        self.rank_ladder()?;

        if self.points.viral_threshold == 0 {
            return Err(dojo_common::Error::InvalidConfig(
                "points.viral_threshold must be at least 1".to_string(),
            )
            .into());
        }

        debug!("Configuration validation passed");
        Ok(())
    }

    pub fn rank_ladder(&self) -> Result<RankLadder> {
        RankLadder::new(self.ranks.clone()).context("Invalid [[ranks]] configuration")
    }
}
