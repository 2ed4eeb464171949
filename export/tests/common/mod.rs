#![allow(dead_code)]

use async_trait::async_trait;
use rd_core::{ReportBlock, ReportDocument, ReportPage};
use rd_engine::{measure_document, FlowLayout, MetricsSnapshot, PageGeometry, SimpleMeasurer};
use rd_export::{PdfRenderer, RenderJob, RendererError, RendererFactory, RendererHandle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Default)]
pub struct Calls {
    pub launches: AtomicUsize,
    pub renders: AtomicUsize,
    pub closes: AtomicUsize,
    pub last_job: Mutex<Option<RenderJob>>,
}

impl Calls {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn last_markup(&self) -> String {
        self.last_job.lock().unwrap().as_ref().map(|j| j.markup.clone()).unwrap_or_default()
    }
}

#[derive(Clone, Default)]
pub enum Behavior {
    #[default]
    Succeed,
    /// Fails the first render, succeeds afterwards.
    FailOnce,
    /// Waits for the notify before answering.
    Gated(Arc<Notify>),
    Sleep(Duration),
}

#[derive(Clone)]
pub struct FakeRenderer {
    pub calls: Arc<Calls>,
    behavior: Behavior,
}

impl FakeRenderer {
    pub fn new(behavior: Behavior) -> Self {
        Self { calls: Arc::new(Calls::default()), behavior }
    }

    pub fn handle(&self) -> RendererHandle {
        RendererHandle::new(self.clone(), Duration::from_secs(30))
    }
}

#[async_trait]
impl PdfRenderer for FakeRenderer {
    async fn render(&self, job: &RenderJob) -> Result<Vec<u8>, RendererError> {
        let call = self.calls.renders.fetch_add(1, Ordering::SeqCst);
        *self.calls.last_job.lock().unwrap() = Some(job.clone());
        match &self.behavior {
            Behavior::Succeed => {}
            Behavior::FailOnce if call == 0 => return Err(RendererError::Render("page crashed".into())),
            Behavior::FailOnce => {}
            Behavior::Gated(release) => release.notified().await,
            Behavior::Sleep(duration) => tokio::time::sleep(*duration).await,
        }
        Ok(b"%PDF-1.7 fake".to_vec())
    }

    async fn close(&self) -> Result<(), RendererError> {
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl RendererFactory for FakeRenderer {
    async fn launch(&self) -> Result<Arc<dyn PdfRenderer>, RendererError> {
        self.calls.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.clone()))
    }
}

pub fn line(id: usize) -> ReportBlock {
    ReportBlock::Text { id: Arc::from(format!("t{}", id)), content: Arc::from("x"), style: None }
}

/// 30px per single-line block on A4: 32 fit, 33 overflow.
pub fn page_with_lines(id: &str, count: usize) -> ReportPage {
    ReportPage::new(id).with_blocks((0..count).map(line))
}

pub fn layout() -> FlowLayout {
    FlowLayout::with_measurer(PageGeometry::A4, SimpleMeasurer)
}

pub fn measured(doc: &ReportDocument) -> MetricsSnapshot {
    measure_document(&mut layout(), doc)
}
