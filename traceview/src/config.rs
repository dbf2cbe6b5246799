use crate::FilterCriteria;
use serde::{Deserialize, Serialize};

/// Analysis configuration for the command line tool (toml format).
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterCriteria,

    #[serde(default)]
    pub flame: FlameConfig,
}

/// Pixel dimensions used for the flame graph layout pass.
#[derive(Debug, Serialize, Deserialize)]
pub struct FlameConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
}

impl Default for FlameConfig {
    fn default() -> Self {
        FlameConfig {
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_width() -> f64 {
    1200.0
}

fn default_height() -> f64 {
    400.0
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.filter, FilterCriteria::default());
        assert_eq!(config.flame.width, 1200.0);
        assert_eq!(config.flame.height, 400.0);
    }

    #[rstest]
    fn test_full_config() {
        let config: Config = toml::from_str(
            r#"
            [filter]
            processIds = [1]
            eventTypes = ["X"]
            searchTerm = "parse"

            [flame]
            width = 800.0
            "#,
        )
        .unwrap();
        assert_eq!(config.filter.process_ids, Some(vec![1]));
        assert_eq!(config.filter.event_types, Some(vec!["X".to_string()]));
        assert_eq!(config.flame.width, 800.0);
        assert_eq!(config.flame.height, 400.0);
    }
}
