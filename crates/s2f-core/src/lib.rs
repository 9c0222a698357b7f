//! s2f-core: shared vocabulary for sun2flops clients.
//!
//! Contains:
//! - schema (run request, simulation config and run options with defaults)
//! - status (run handle, run state, run status)
//! - numeric (lenient metric map decoding)
//! - hash (request fingerprints)

pub mod hash;
pub mod numeric;
pub mod schema;
pub mod status;

pub use hash::config_fingerprint;
pub use numeric::NumericMap;
pub use schema::*;
pub use status::{RunHandle, RunState, RunStatus};

use std::path::Path;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported config format: {path}")]
    UnsupportedFormat { path: String },
}

enum ConfigFormat {
    Yaml,
    Json,
}

fn format_for(path: &Path) -> CoreResult<ConfigFormat> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
        Some("json") => Ok(ConfigFormat::Json),
        _ => Err(CoreError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

/// Load a simulation config from a `.yaml`/`.yml` or `.json` file.
pub fn load_config(path: &Path) -> CoreResult<FullConfig> {
    let format = format_for(path)?;
    let content = std::fs::read_to_string(path)?;
    let config = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(&content)?,
        ConfigFormat::Json => serde_json::from_str(&content)?,
    };
    Ok(config)
}

pub fn save_config(path: &Path, config: &FullConfig) -> CoreResult<()> {
    let content = match format_for(path)? {
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
    };
    std::fs::write(path, content)?;
    Ok(())
}
