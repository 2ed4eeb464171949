use crate::error::ConfigError;
use rd_engine::{ObserverConfig, PageGeometry};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_RENDER_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    pub render_timeout_ms: u64,
    /// Program and arguments of the external PDF renderer.
    pub renderer_command: Option<Vec<String>>,
    pub observer: ObserverConfig,
    pub geometry: PageGeometry,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            render_timeout_ms: DEFAULT_RENDER_TIMEOUT_MS,
            renderer_command: None,
            observer: ObserverConfig::default(),
            geometry: PageGeometry::A4,
        }
    }
}

impl ExportConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = ExportConfig { observer: ObserverConfig::from_env(), ..ExportConfig::default() };
        if let Ok(value) = std::env::var("RD_RENDER_TIMEOUT_MS") {
            config.render_timeout_ms = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { name: "RD_RENDER_TIMEOUT_MS", value })?;
        }
        if let Ok(line) = std::env::var("RD_RENDERER_CMD") {
            config.renderer_command = split_command_line(&line);
        }
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }
}

/// Whitespace separated program and arguments; None when blank.
pub fn split_command_line(line: &str) -> Option<Vec<String>> {
    let parts: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}
