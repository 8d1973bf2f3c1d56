//! Engine configuration loading.
use std::env;
use std::path::Path;

use pattern_core::EngineConfig;

/// Result type for configuration loading.
pub type LoadResult<T> = anyhow::Result<T>;

/// Loads [`EngineConfig`] from TOML or the process environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config. Zero caps and a non-finite speed are rejected.
    pub fn from_toml_str(content: &str) -> LoadResult<EngineConfig> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse engine config TOML: {}", e))?;
        validate(&config)?;
        Ok(config)
    }

    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PATTERN_MAX_ITERATIONS_PER_TICK` - same-tick repeat cap (default: 4096)
    /// - `PATTERN_MAX_NESTING_DEPTH` - action nesting cap (default: 64)
    /// - `PATTERN_DEFAULT_SPEED` - speed of fires with nothing to inherit (default: 1.0)
    pub fn from_env() -> EngineConfig {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`ConfigLoader::from_env`], reading values through `lookup`.
    ///
    /// Caps are clamped to at least 1. Unparsable values and a non-finite
    /// speed fall back to the defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> EngineConfig {
        let mut config = EngineConfig::default();

        if let Some(max) = read_var::<usize>(&lookup, "PATTERN_MAX_ITERATIONS_PER_TICK") {
            config.max_iterations_per_tick = max.max(1);
        }
        if let Some(depth) = read_var::<usize>(&lookup, "PATTERN_MAX_NESTING_DEPTH") {
            config.max_nesting_depth = depth.max(1);
        }
        if let Some(speed) =
            read_var::<f32>(&lookup, "PATTERN_DEFAULT_SPEED").filter(|s| s.is_finite())
        {
            config.default_speed = speed;
        }

        config
    }
}

fn validate(config: &EngineConfig) -> LoadResult<()> {
    anyhow::ensure!(
        config.max_iterations_per_tick > 0,
        "max_iterations_per_tick must be at least 1"
    );
    anyhow::ensure!(config.max_nesting_depth > 0, "max_nesting_depth must be at least 1");
    anyhow::ensure!(config.default_speed.is_finite(), "default_speed must be finite");
    Ok(())
}

fn read_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.parse().ok()
}
