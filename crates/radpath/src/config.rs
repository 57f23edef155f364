use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::route::overlay::DEFAULT_OFFSET;
use crate::route::types::{ConflictPolicy, PlannerConfig};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "radpath";

const VALID_KEYS: &str = "planner.loop_lenience, planner.palette_size, planner.conflict_policy, \
                          output.pretty, output.offset";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planner: Option<PlannerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `radpath config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# radpath configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Planner settings with defaults filled in.
    pub fn planner(&self) -> PlannerConfig {
        self.planner.clone().unwrap_or_default()
    }

    pub fn pretty(&self) -> bool {
        self.output.as_ref().and_then(|o| o.pretty).unwrap_or(false)
    }

    pub fn offset(&self) -> f64 {
        self.output
            .as_ref()
            .and_then(|o| o.offset)
            .unwrap_or(DEFAULT_OFFSET)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "planner.loop_lenience" => {
                let Ok(lenience) = value.parse::<usize>() else {
                    anyhow::bail!(
                        "Invalid loop_lenience: {value}. Must be a non-negative integer."
                    );
                };
                self.planner
                    .get_or_insert_with(PlannerConfig::default)
                    .loop_lenience = lenience;
            }
            "planner.palette_size" => {
                let palette_size = match value.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => anyhow::bail!(
                        "Invalid palette_size: {value}. Must be a positive integer."
                    ),
                };
                self.planner
                    .get_or_insert_with(PlannerConfig::default)
                    .palette_size = palette_size;
            }
            "planner.conflict_policy" => {
                let Some(policy) = ConflictPolicy::from_name(value) else {
                    let names: Vec<&str> = ConflictPolicy::all().iter().map(|p| p.name()).collect();
                    anyhow::bail!(
                        "Invalid conflict_policy: {value}. Must be one of: {}.",
                        names.join(", ")
                    );
                };
                self.planner
                    .get_or_insert_with(PlannerConfig::default)
                    .conflict_policy = policy;
            }
            "output.pretty" => {
                let pretty = match value {
                    "true" | "yes" | "on" => true,
                    "false" | "no" | "off" => false,
                    _ => anyhow::bail!("Invalid pretty: {value}. Must be 'true' or 'false'."),
                };
                self.output.get_or_insert_with(OutputConfig::default).pretty = Some(pretty);
            }
            "output.offset" => {
                let offset = match value.parse::<f64>() {
                    Ok(d) if d.is_finite() && d >= 0.0 => d,
                    _ => anyhow::bail!("Invalid offset: {value}. Must be a non-negative number."),
                };
                self.output.get_or_insert_with(OutputConfig::default).offset = Some(offset);
            }
            _ => anyhow::bail!("Unknown config key: {key}. Valid keys: {VALID_KEYS}"),
        }
        Ok(())
    }
}
