use crate::geometry::PageGeometry;
use crate::layout::LayoutSurface;
use crate::measure::{measure_document, MetricsSnapshot};
use rd_core::{ReportDocument, SharedStr};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE_MS: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObserverConfig {
    /// Signals arriving within this window of the first pending one are
    /// folded into a single measurement pass.
    pub debounce_ms: u64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self { debounce_ms: DEFAULT_DEBOUNCE_MS }
    }
}

impl ObserverConfig {
    pub fn from_env() -> Self {
        let debounce_ms = std::env::var("RD_MEASURE_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_DEBOUNCE_MS);
        Self { debounce_ms }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone)]
pub enum LayoutSignal {
    DocumentChanged { revision: u64, document: Arc<ReportDocument> },
    /// `epoch` counts layout-affecting signals sent so far, this one included.
    ImageLoaded { epoch: u64, src: SharedStr, width: f32, height: f32 },
    GeometryChanged { epoch: u64, geometry: PageGeometry },
}

pub type SnapshotReceiver = watch::Receiver<Option<Arc<MetricsSnapshot>>>;

/// Re-measures the current document whenever something that can change page
/// heights happens, publishing each result as a fresh snapshot.
pub struct LayoutObserver {
    signals: mpsc::UnboundedSender<LayoutSignal>,
    snapshots: SnapshotReceiver,
    revision: AtomicU64,
    layout_epoch: AtomicU64,
    task: JoinHandle<()>,
}

impl LayoutObserver {
    /// Must be called inside a tokio runtime.
    pub fn spawn<S>(surface: S, config: ObserverConfig) -> Self
    where
        S: LayoutSurface + Send + 'static,
    {
        let (signals, rx) = mpsc::unbounded_channel();
        let (publish, snapshots) = watch::channel(None);
        let task = tokio::spawn(run(surface, rx, publish, config.debounce()));
        Self { signals, snapshots, revision: AtomicU64::new(0), layout_epoch: AtomicU64::new(0), task }
    }

    /// Queues a new document value and returns the revision it was given.
    pub fn document_changed(&self, document: Arc<ReportDocument>) -> u64 {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        self.send(LayoutSignal::DocumentChanged { revision, document });
        revision
    }

    /// Until the observer has seen this signal, published snapshots count as
    /// stale for `layout_epoch()`.
    pub fn image_loaded(&self, src: impl Into<SharedStr>, width: f32, height: f32) {
        let epoch = self.next_layout_epoch();
        self.send(LayoutSignal::ImageLoaded { epoch, src: src.into(), width, height });
    }

    pub fn geometry_changed(&self, geometry: PageGeometry) {
        let epoch = self.next_layout_epoch();
        self.send(LayoutSignal::GeometryChanged { epoch, geometry });
    }

    fn next_layout_epoch(&self) -> u64 {
        self.layout_epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn send(&self, signal: LayoutSignal) {
        if self.signals.send(signal).is_err() {
            tracing::warn!("layout observer stopped, signal dropped");
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    pub fn layout_epoch(&self) -> u64 {
        self.layout_epoch.load(Ordering::SeqCst)
    }

    pub fn latest(&self) -> Option<Arc<MetricsSnapshot>> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> SnapshotReceiver {
        self.snapshots.clone()
    }

    /// Waits until a snapshot for `revision` or later is published.
    pub async fn measured(&self, revision: u64) -> Option<Arc<MetricsSnapshot>> {
        let mut rx = self.snapshots.clone();
        let result = rx
            .wait_for(|s| s.as_ref().is_some_and(|s| s.revision >= revision))
            .await;
        match result {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => None,
        }
    }

    /// Waits until the latest document and every layout signal sent so far
    /// are reflected in a published snapshot.
    pub async fn settled(&self) -> Option<Arc<MetricsSnapshot>> {
        let (revision, epoch) = (self.revision(), self.layout_epoch());
        let mut rx = self.snapshots.clone();
        let result = rx
            .wait_for(|s| s.as_ref().is_some_and(|s| s.revision >= revision && s.layout_epoch >= epoch))
            .await;
        match result {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => None,
        }
    }

    /// Stops accepting signals, measures whatever is still pending and joins
    /// the task. Returns the last published snapshot.
    pub async fn shutdown(self) -> Option<Arc<MetricsSnapshot>> {
        let LayoutObserver { signals, snapshots, task, .. } = self;
        drop(signals);
        if let Err(err) = task.await {
            tracing::warn!(%err, "layout observer task failed");
        }
        let latest = snapshots.borrow().clone();
        latest
    }
}

struct Pending {
    document: Option<(u64, Arc<ReportDocument>)>,
    deadline: Option<Instant>,
    passes: u64,
    layout_epoch: u64,
}

impl Pending {
    fn measure<S: LayoutSurface>(&mut self, surface: &mut S, publish: &watch::Sender<Option<Arc<MetricsSnapshot>>>) {
        self.deadline = None;
        let Some((revision, document)) = &self.document else {
            return;
        };
        self.passes += 1;
        let mut snapshot = measure_document(surface, document);
        snapshot.pass = self.passes;
        snapshot.revision = *revision;
        snapshot.layout_epoch = self.layout_epoch;
        tracing::debug!(
            pass = snapshot.pass,
            revision = snapshot.revision,
            pages = snapshot.pages.len(),
            overflowing = snapshot.pages.iter().filter(|m| m.overflow).count(),
            "measurement pass"
        );
        publish.send_replace(Some(Arc::new(snapshot)));
    }

    /// A layout signal that changed nothing still makes the current snapshot
    /// valid for its epoch.
    fn acknowledge(&self, publish: &watch::Sender<Option<Arc<MetricsSnapshot>>>) {
        let epoch = self.layout_epoch;
        publish.send_if_modified(|latest| match latest {
            Some(snapshot) if snapshot.layout_epoch < epoch => {
                let mut next = (**snapshot).clone();
                next.layout_epoch = epoch;
                *snapshot = Arc::new(next);
                true
            }
            _ => false,
        });
    }
}

async fn run<S: LayoutSurface>(
    mut surface: S,
    mut rx: mpsc::UnboundedReceiver<LayoutSignal>,
    publish: watch::Sender<Option<Arc<MetricsSnapshot>>>,
    debounce: Duration,
) {
    let mut pending = Pending { document: None, deadline: None, passes: 0, layout_epoch: 0 };
    loop {
        let signal = match pending.deadline {
            Some(deadline) => tokio::select! {
                signal = rx.recv() => signal,
                _ = tokio::time::sleep_until(deadline) => {
                    pending.measure(&mut surface, &publish);
                    continue;
                }
            },
            None => rx.recv().await,
        };
        let Some(signal) = signal else {
            break;
        };
        let relevant = match signal {
            LayoutSignal::DocumentChanged { revision, document } => {
                pending.document = Some((revision, document));
                true
            }
            LayoutSignal::ImageLoaded { epoch, src, width, height } => {
                pending.layout_epoch = pending.layout_epoch.max(epoch);
                surface.image_loaded(&src, width, height)
            }
            LayoutSignal::GeometryChanged { epoch, geometry } => {
                pending.layout_epoch = pending.layout_epoch.max(epoch);
                let changed = surface.geometry() != geometry;
                surface.set_geometry(geometry);
                changed
            }
        };
        if relevant && pending.deadline.is_none() {
            pending.deadline = Some(Instant::now() + debounce);
        } else if pending.deadline.is_none() {
            pending.acknowledge(&publish);
        }
    }
    if pending.deadline.is_some() {
        pending.measure(&mut surface, &publish);
    }
    tracing::debug!(passes = pending.passes, "layout observer stopped");
}
