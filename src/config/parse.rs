use super::types::Config;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),
}

/// Loads and validates a config file. Missing fields fall back to their
/// defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let yaml = fs::read_to_string(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open config file '{}': {}", path.display(), e),
        ))
    })?;

    let config: Config = serde_yaml::from_str(&yaml)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.producer_count() == 0 {
        errors.push(
            "at least one producer is required (producers.timed > 0 or producers.interactive)"
                .to_string(),
        );
    }
    if config.run_duration.is_zero() {
        errors.push("run_duration must be greater than zero".to_string());
    }
    if config.delay.min_idle_pause.is_zero() {
        errors.push("delay.min_idle_pause must be greater than zero".to_string());
    }
    if config.collector.read_chunk_size == 0 {
        errors.push("collector.read_chunk_size must be greater than zero".to_string());
    }
    if config.collector.max_line_len == 0 {
        errors.push("collector.max_line_len must be greater than zero".to_string());
    }
    if config.collector.channel_capacity < config.collector.max_line_len {
        errors.push(format!(
            "collector.channel_capacity ({}) must be at least collector.max_line_len ({})",
            config.collector.channel_capacity, config.collector.max_line_len
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors))
    }
}
