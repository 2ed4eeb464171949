use crate::config::ExportConfig;
use crate::error::{ConfigError, ExportError, RendererError};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::{OnceCell, RwLock};

/// One complete print document and the name the PDF will be delivered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    pub markup: String,
    pub filename: String,
}

/// External capability turning print markup into PDF bytes.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, job: &RenderJob) -> Result<Vec<u8>, RendererError>;

    async fn close(&self) -> Result<(), RendererError> {
        Ok(())
    }
}

#[async_trait]
pub trait RendererFactory: Send + Sync {
    async fn launch(&self) -> Result<Arc<dyn PdfRenderer>, RendererError>;
}

/// Process-wide renderer: launched on first use, shared by all exports,
/// closed once on shutdown after in-flight renders finish.
pub struct RendererHandle {
    factory: Box<dyn RendererFactory>,
    renderer: OnceCell<Arc<dyn PdfRenderer>>,
    open: RwLock<bool>,
    timeout: Duration,
}

impl RendererHandle {
    pub fn new(factory: impl RendererFactory + 'static, timeout: Duration) -> Self {
        Self {
            factory: Box::new(factory),
            renderer: OnceCell::new(),
            open: RwLock::new(true),
            timeout,
        }
    }

    /// Command renderer from `RD_RENDERER_CMD` style configuration.
    pub fn from_config(config: &ExportConfig) -> Result<Self, ConfigError> {
        let command = config
            .renderer_command
            .as_deref()
            .and_then(CommandRenderer::from_parts)
            .ok_or(ConfigError::MissingRendererCommand)?;
        Ok(Self::new(command, config.render_timeout()))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_launched(&self) -> bool {
        self.renderer.initialized()
    }

    async fn renderer(&self) -> Result<Arc<dyn PdfRenderer>, RendererError> {
        let renderer = self
            .renderer
            .get_or_try_init(|| async {
                tracing::info!("launching pdf renderer");
                self.factory.launch().await
            })
            .await?;
        Ok(renderer.clone())
    }

    /// Renders one job. The launch counts against the timeout as well.
    pub async fn render(&self, job: &RenderJob) -> Result<Vec<u8>, ExportError> {
        let open = self.open.read().await;
        if !*open {
            return Err(RendererError::Closed.into());
        }
        let work = async {
            let renderer = self.renderer().await?;
            renderer.render(job).await
        };
        let result = match tokio::time::timeout(self.timeout, work).await {
            Ok(result) => result.map_err(ExportError::from),
            Err(_) => Err(ExportError::Timeout(self.timeout)),
        };
        drop(open);
        result
    }

    /// Refuses new work, waits for running renders and closes the renderer
    /// if it was ever launched. Calling it again is a no-op.
    pub async fn shutdown(&self) -> Result<(), RendererError> {
        let mut open = self.open.write().await;
        if !*open {
            return Ok(());
        }
        *open = false;
        match self.renderer.get() {
            Some(renderer) => {
                tracing::info!("closing pdf renderer");
                renderer.close().await
            }
            None => Ok(()),
        }
    }
}

/// Pipes markup to an external program's stdin and reads the PDF from its stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_parts(parts: &[String]) -> Option<Self> {
        let (program, args) = parts.split_first()?;
        Some(Self::new(program.clone(), args.iter().cloned()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl PdfRenderer for CommandRenderer {
    async fn render(&self, job: &RenderJob) -> Result<Vec<u8>, RendererError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RendererError::Render("renderer stdin unavailable".into()))?;
        let markup = job.markup.as_bytes();
        let write = async move {
            stdin.write_all(markup).await?;
            stdin.shutdown().await
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RendererError::Render(format!("{} exited with {}: {}", self.program, output.status, stderr.trim())));
        }
        written?;
        if output.stdout.is_empty() {
            return Err(RendererError::Render(format!("{} produced no output", self.program)));
        }
        tracing::debug!(file = %job.filename, bytes = output.stdout.len(), "pdf rendered");
        Ok(output.stdout)
    }
}

#[async_trait]
impl RendererFactory for CommandRenderer {
    async fn launch(&self) -> Result<Arc<dyn PdfRenderer>, RendererError> {
        tracing::info!(program = %self.program, "using command renderer");
        Ok(Arc::new(self.clone()))
    }
}
