//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use telebridge_core::error::{Result, TelemetryError};

pub use schema::{EchoSection, GatewayConfig, ServerSection, TelemetrySection};

/// Environment variable consulted when no path is given on the command line.
pub const CONFIG_ENV: &str = "TELEBRIDGE_CONFIG";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TelemetryError::Internal(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| TelemetryError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the config source: explicit path, then `TELEBRIDGE_CONFIG`, then built-in defaults.
pub fn load(path: Option<&str>) -> Result<GatewayConfig> {
    let from_env = std::env::var(CONFIG_ENV).ok();
    match path.or(from_env.as_deref()) {
        Some(p) => load_from_file(p),
        None => {
            let cfg = GatewayConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }
}
