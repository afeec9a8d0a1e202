use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::allocator::{AllocationPolicy, DEFAULT_CLOSEOUT_MULTIPLIER, DEFAULT_MAX_POSTS_PER_CREATOR};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub allocation: AllocationConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_creators_path")]
    pub creators_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    #[serde(default = "default_max_posts_per_creator")]
    pub max_posts_per_creator: u32,
    #[serde(default = "default_closeout_multiplier")]
    pub closeout_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub creators_path: Option<String>,
    pub max_posts_per_creator: Option<u32>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/seeding-planner/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.creators_path {
            self.data.creators_path = path;
        }
        if let Some(max_posts) = overrides.max_posts_per_creator {
            self.allocation.max_posts_per_creator = max_posts;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_creators_path(&self) -> PathBuf {
        expand_tilde(&self.data.creators_path)
    }

    pub fn policy(&self) -> AllocationPolicy {
        AllocationPolicy {
            max_posts_per_creator: self.allocation.max_posts_per_creator.max(1),
            closeout_multiplier: self.allocation.closeout_multiplier,
        }
    }

    pub fn default_template() -> String {
        let template = r#"[data]
# JSON array or CSV export of the creator database
creators_path = "~/.local/share/seeding-planner/creators.json"

[allocation]
max_posts_per_creator = 2
closeout_multiplier = 1.5

[server]
host = "127.0.0.1"
port = 3001
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            creators_path: default_creators_path(),
        }
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            max_posts_per_creator: default_max_posts_per_creator(),
            closeout_multiplier: default_closeout_multiplier(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_creators_path() -> String {
    "~/.local/share/seeding-planner/creators.json".to_string()
}

fn default_max_posts_per_creator() -> u32 {
    DEFAULT_MAX_POSTS_PER_CREATOR
}

fn default_closeout_multiplier() -> f64 {
    DEFAULT_CLOSEOUT_MULTIPLIER
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_round_trips_to_defaults() {
        let parsed: Config = toml::from_str(&Config::default_template()).expect("template");
        assert_eq!(parsed.policy(), AllocationPolicy::default());
        assert_eq!(parsed.server.port, 3001);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config =
            toml::from_str("[allocation]\nmax_posts_per_creator = 4\n").expect("partial");
        assert_eq!(parsed.allocation.max_posts_per_creator, 4);
        assert_eq!(parsed.allocation.closeout_multiplier, 1.5);
        assert_eq!(parsed.server.host, "127.0.0.1");
    }

    #[test]
    fn overrides_replace_values() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            creators_path: Some("/tmp/creators.csv".to_string()),
            max_posts_per_creator: Some(0),
        });
        assert_eq!(config.resolved_creators_path(), PathBuf::from("/tmp/creators.csv"));
        assert_eq!(config.policy().max_posts_per_creator, 1);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/seeding.toml"))).expect("load");
        assert_eq!(config.allocation.max_posts_per_creator, 2);
    }
}
