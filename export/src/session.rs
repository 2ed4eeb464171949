use crate::config::ExportConfig;
use crate::error::{ExportError, RendererError};
use crate::gate::{eligibility_at, Eligibility, ExportGate, ExportOutcome};
use crate::renderer::RendererHandle;
use crate::request::MarkupResponse;
use rd_core::{validate, BlockSelection, EditCommand, ReportDocument, SharedStr, StructuralIssue};
use rd_engine::{LayoutObserver, LayoutSurface, MetricsSnapshot};
use std::future::Future;
use std::sync::Arc;

/// Owns the current document value and wires edits to measurement and export.
pub struct ReportSession {
    document: Arc<ReportDocument>,
    selection: Option<BlockSelection>,
    observer: LayoutObserver,
    gate: Arc<ExportGate>,
    renderer: Arc<RendererHandle>,
}

impl ReportSession {
    /// Must be called inside a tokio runtime; spawns the layout observer.
    pub fn new<S>(document: ReportDocument, surface: S, renderer: RendererHandle, config: &ExportConfig) -> Self
    where
        S: LayoutSurface + Send + 'static,
    {
        let document = Arc::new(document);
        let observer = LayoutObserver::spawn(surface, config.observer);
        observer.geometry_changed(config.geometry);
        observer.document_changed(document.clone());
        let renderer = Arc::new(renderer);
        Self {
            selection: BlockSelection::initial(&document),
            gate: Arc::new(ExportGate::new(renderer.clone(), config.geometry)),
            document,
            observer,
            renderer,
        }
    }

    pub fn document(&self) -> &Arc<ReportDocument> {
        &self.document
    }

    pub fn selection(&self) -> Option<&BlockSelection> {
        self.selection.as_ref()
    }

    /// Selects a block if it exists and is editable.
    pub fn select(&mut self, selection: BlockSelection) -> bool {
        if !selection.resolves_in(&self.document) {
            return false;
        }
        self.selection = Some(selection);
        true
    }

    /// Applies one edit. Returns false when it left the document unchanged.
    pub fn apply(&mut self, command: EditCommand) -> bool {
        let next = command.apply(&self.document);
        if next == *self.document {
            tracing::debug!(page = command.page_id(), "edit had no effect");
            return false;
        }
        self.publish(next);
        true
    }

    /// Swaps in a whole new document, e.g. after loading.
    pub fn replace_document(&mut self, document: ReportDocument) {
        self.publish(document);
    }

    fn publish(&mut self, document: ReportDocument) {
        self.document = Arc::new(document);
        let revision = self.observer.document_changed(self.document.clone());
        tracing::debug!(revision, fingerprint = self.document.fingerprint(), "document updated");
        if !self.selection.as_ref().is_some_and(|s| s.resolves_in(&self.document)) {
            self.selection = BlockSelection::initial(&self.document);
        }
    }

    pub fn issues(&self) -> Vec<StructuralIssue> {
        validate(&self.document)
    }

    pub fn image_loaded(&self, src: &str, width: f32, height: f32) {
        self.observer.image_loaded(src, width, height);
    }

    /// Latest published measurements; may describe an older document value.
    pub fn metrics(&self) -> Option<Arc<MetricsSnapshot>> {
        self.observer.latest()
    }

    /// Waits for the measurement of the current document, including image
    /// loads and geometry changes already signalled.
    pub async fn settled(&self) -> Option<Arc<MetricsSnapshot>> {
        self.observer.settled().await
    }

    pub fn eligibility(&self) -> Eligibility {
        eligibility_at(&self.document, self.metrics().as_deref(), self.observer.layout_epoch())
    }

    /// Overflowing pages of the current document, empty while unmeasured.
    pub fn overflowing_pages(&self) -> Vec<SharedStr> {
        match self.metrics() {
            Some(snapshot) if snapshot.is_current_at(&self.document, self.observer.layout_epoch()) => {
                snapshot.overflowing_pages()
            }
            _ => Vec::new(),
        }
    }

    pub fn can_export(&self) -> bool {
        self.eligibility().is_eligible() && !self.gate.is_busy()
    }

    /// Export of the document as it is now. The returned future owns what it
    /// needs, so the session can keep taking edits while it runs.
    pub fn export(&self) -> impl Future<Output = Result<ExportOutcome, ExportError>> + Send + 'static {
        let gate = self.gate.clone();
        let document = self.document.clone();
        let layout_epoch = self.observer.layout_epoch();
        let snapshot = self.metrics();
        async move { gate.export_at(&document, snapshot.as_deref(), layout_epoch).await }
    }

    pub fn markup(&self) -> MarkupResponse {
        MarkupResponse { body: self.gate.markup(&self.document) }
    }

    /// Stops the observer, then closes the renderer once running exports finish.
    pub async fn shutdown(self) -> Result<(), RendererError> {
        let ReportSession { observer, renderer, .. } = self;
        observer.shutdown().await;
        renderer.shutdown().await
    }
}
