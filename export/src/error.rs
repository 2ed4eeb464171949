use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("renderer failed to launch: {0}")]
    Launch(String),
    #[error("renderer failed: {0}")]
    Render(String),
    #[error("renderer is shut down")]
    Closed,
    #[error("renderer io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of an export that reached the external renderer.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Renderer(#[from] RendererError),
    #[error("renderer did not finish within {0:?}")]
    Timeout(Duration),
}

impl ExportError {
    /// Whether asking again may succeed. A closed renderer never comes back.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ExportError::Renderer(RendererError::Closed))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not a valid number: {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("invalid export config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no renderer command configured, set RD_RENDERER_CMD")]
    MissingRendererCommand,
}
