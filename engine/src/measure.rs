use crate::layout::LayoutSurface;
use crate::render::{render_visual_tree, VisualTree};
use rd_core::{ReportDocument, SharedStr};
use serde::{Deserialize, Serialize};

/// Sub-pixel rounding slack before a page counts as overflowing.
pub const OVERFLOW_TOLERANCE: f32 = 1.0;

pub fn exceeds_capacity(content_height: f32, capacity: f32) -> bool {
    content_height > capacity + OVERFLOW_TOLERANCE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetric {
    pub page_id: SharedStr,
    pub content_height: f32,
    pub max_height: f32,
    pub overflow: bool,
}

impl PageMetric {
    pub fn new(page_id: impl Into<SharedStr>, content_height: f32, max_height: f32) -> Self {
        Self {
            page_id: page_id.into(),
            content_height,
            max_height,
            overflow: exceeds_capacity(content_height, max_height),
        }
    }
}

/// One complete measurement of a document. Snapshots are replaced as a
/// whole, never patched page by page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Measurement passes run by the producer so far, this one included.
    pub pass: u64,
    /// Document revision the pass measured.
    pub revision: u64,
    /// Fingerprint of the measured document.
    pub fingerprint: u64,
    /// Image loads and geometry changes taken into account.
    #[serde(default)]
    pub layout_epoch: u64,
    pub pages: Vec<PageMetric>,
}

impl MetricsSnapshot {
    pub fn new(fingerprint: u64, pages: Vec<PageMetric>) -> Self {
        Self { pass: 1, revision: 0, fingerprint, layout_epoch: 0, pages }
    }

    pub fn is_current_for(&self, doc: &ReportDocument) -> bool {
        self.fingerprint == doc.fingerprint()
    }

    /// Current for `doc` with every layout signal up to `layout_epoch` applied.
    pub fn is_current_at(&self, doc: &ReportDocument, layout_epoch: u64) -> bool {
        self.is_current_for(doc) && self.layout_epoch >= layout_epoch
    }

    pub fn overflowing_pages(&self) -> Vec<SharedStr> {
        self.pages
            .iter()
            .filter(|m| m.overflow)
            .map(|m| m.page_id.clone())
            .collect()
    }

    pub fn has_overflow(&self) -> bool {
        self.pages.iter().any(|m| m.overflow)
    }

    pub fn page(&self, page_id: &str) -> Option<&PageMetric> {
        self.pages.iter().find(|m| m.page_id.as_ref() == page_id)
    }
}

pub fn measure_tree<S: LayoutSurface + ?Sized>(surface: &mut S, tree: &VisualTree) -> Vec<PageMetric> {
    tree.pages
        .iter()
        .map(|page| {
            let realized = surface.realize(page);
            PageMetric::new(realized.page_id, realized.content_height, realized.capacity)
        })
        .collect()
}

/// Builds the interactive tree for `doc` and measures every page once.
pub fn measure_document<S: LayoutSurface + ?Sized>(surface: &mut S, doc: &ReportDocument) -> MetricsSnapshot {
    let tree = render_visual_tree(doc);
    let pages = measure_tree(surface, &tree);
    MetricsSnapshot::new(tree.fingerprint, pages)
}
