use crate::error::ExportError;
use crate::renderer::{RenderJob, RendererHandle};
use rd_core::{ReportDocument, SharedStr};
use rd_engine::{render_static_document, MetricsSnapshot, PageGeometry};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Why eligibility cannot be decided yet. Every variant blocks export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UnknownReason {
    /// No measurement pass has completed.
    NotMeasured,
    /// The latest pass measured a different document value.
    Stale,
    /// The measured document has no pages.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Eligibility {
    Eligible,
    Blocked { overflowing: Vec<SharedStr> },
    Unknown { reason: UnknownReason },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

pub fn eligibility(doc: &ReportDocument, snapshot: Option<&MetricsSnapshot>) -> Eligibility {
    eligibility_at(doc, snapshot, 0)
}

/// Like [`eligibility`], but a snapshot that has not yet seen every layout
/// signal up to `layout_epoch` (image loads, geometry changes) is stale.
pub fn eligibility_at(doc: &ReportDocument, snapshot: Option<&MetricsSnapshot>, layout_epoch: u64) -> Eligibility {
    let Some(snapshot) = snapshot else {
        return Eligibility::Unknown { reason: UnknownReason::NotMeasured };
    };
    if !snapshot.is_current_at(doc, layout_epoch) || snapshot.pages.len() != doc.pages.len() {
        return Eligibility::Unknown { reason: UnknownReason::Stale };
    }
    if snapshot.pages.is_empty() {
        return Eligibility::Unknown { reason: UnknownReason::Empty };
    }
    let overflowing = snapshot.overflowing_pages();
    if overflowing.is_empty() {
        Eligibility::Eligible
    } else {
        Eligibility::Blocked { overflowing }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported(PdfArtifact),
    Blocked { overflowing: Vec<SharedStr> },
    NotMeasured(UnknownReason),
    /// Another export is still running; this request was dropped, not queued.
    Busy,
}

/// Marks an export as running for as long as it lives.
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    pub fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub fn pdf_filename(doc: &ReportDocument) -> String {
    format!("{}.pdf", doc.export_stem())
}

/// Decides whether an export may run and runs at most one at a time.
pub struct ExportGate {
    renderer: Arc<RendererHandle>,
    geometry: PageGeometry,
    in_flight: Arc<AtomicBool>,
}

impl ExportGate {
    pub fn new(renderer: Arc<RendererHandle>, geometry: PageGeometry) -> Self {
        Self { renderer, geometry, in_flight: Arc::new(AtomicBool::new(false)) }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn markup(&self, doc: &ReportDocument) -> String {
        render_static_document(doc, &self.geometry)
    }

    pub async fn export(
        &self,
        doc: &ReportDocument,
        snapshot: Option<&MetricsSnapshot>,
    ) -> Result<ExportOutcome, ExportError> {
        self.export_at(doc, snapshot, 0).await
    }

    /// Export checked against the layout epoch the caller has signalled.
    pub async fn export_at(
        &self,
        doc: &ReportDocument,
        snapshot: Option<&MetricsSnapshot>,
        layout_epoch: u64,
    ) -> Result<ExportOutcome, ExportError> {
        match eligibility_at(doc, snapshot, layout_epoch) {
            Eligibility::Eligible => {}
            Eligibility::Blocked { overflowing } => {
                tracing::warn!(pages = ?overflowing, "export blocked by overflowing pages");
                return Ok(ExportOutcome::Blocked { overflowing });
            }
            Eligibility::Unknown { reason } => {
                tracing::warn!(?reason, "export refused without current measurements");
                return Ok(ExportOutcome::NotMeasured(reason));
            }
        }
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::info!("export already in flight");
            return Ok(ExportOutcome::Busy);
        };
        let job = RenderJob { markup: self.markup(doc), filename: pdf_filename(doc) };
        tracing::info!(file = %job.filename, pages = doc.pages.len(), "exporting");
        match self.renderer.render(&job).await {
            Ok(bytes) => Ok(ExportOutcome::Exported(PdfArtifact { filename: job.filename, bytes })),
            Err(err) => {
                tracing::warn!(%err, "export failed");
                Err(err)
            }
        }
    }
}
