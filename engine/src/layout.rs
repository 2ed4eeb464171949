use crate::geometry::{BoxMetrics, PageGeometry, PX_PER_PT};
use crate::image::ImageCache;
use crate::linebreak::LineBreaker;
use crate::metrics::{FontSpec, RealMeasurer, SharedMeasurer, TextMeasurer};
use crate::render::{BlockNode, ColumnNode, PageNode};
use lru::LruCache;
use rd_core::SharedStr;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

#[derive(Debug, Clone, PartialEq)]
pub struct RealizedBlock {
    /// None for blocks rendered empty.
    pub block_id: Option<SharedStr>,
    pub top: f32,
    pub height: f32,
}

/// A page after layout. Heights are in CSS pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RealizedPage {
    pub page_id: SharedStr,
    pub content_height: f32,
    pub capacity: f32,
    pub blocks: Vec<RealizedBlock>,
}

/// Where interactive pages are realized and their heights observed.
pub trait LayoutSurface {
    fn realize(&mut self, page: &PageNode) -> RealizedPage;

    fn geometry(&self) -> PageGeometry;

    fn set_geometry(&mut self, geometry: PageGeometry);

    /// Records a loaded image size. Returns true when pages showing `src`
    /// may now have a different height.
    fn image_loaded(&mut self, _src: &str, _width: f32, _height: f32) -> bool {
        false
    }
}

impl<S: LayoutSurface + ?Sized> LayoutSurface for Box<S> {
    fn realize(&mut self, page: &PageNode) -> RealizedPage {
        (**self).realize(page)
    }

    fn geometry(&self) -> PageGeometry {
        (**self).geometry()
    }

    fn set_geometry(&mut self, geometry: PageGeometry) {
        (**self).set_geometry(geometry)
    }

    fn image_loaded(&mut self, src: &str, width: f32, height: f32) -> bool {
        (**self).image_loaded(src, width, height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct WrapKey {
    text_hash: u64,
    width_q: u32,
    size_q: u16,
    bold: bool,
}

/// Block flow layout with the same box model as the print stylesheet.
pub struct FlowLayout {
    geometry: PageGeometry,
    boxes: BoxMetrics,
    measurer: SharedMeasurer,
    breaker: LineBreaker,
    images: ImageCache,
    wrap_cache: LruCache<WrapKey, usize>,
    wrap_hits: u64,
    wrap_misses: u64,
}

impl FlowLayout {
    pub fn new(geometry: PageGeometry) -> Self {
        Self::with_measurer(geometry, RealMeasurer::new())
    }

    pub fn with_measurer(geometry: PageGeometry, measurer: impl TextMeasurer + 'static) -> Self {
        let low_spec = std::env::var("RD_LOW_SPEC").ok().as_deref() == Some("1");
        let cap = if low_spec { 512 } else { 2048 };
        Self {
            geometry,
            boxes: BoxMetrics::STANDARD,
            measurer: SharedMeasurer::new(measurer),
            breaker: LineBreaker,
            images: ImageCache::new(),
            wrap_cache: LruCache::new(NonZeroUsize::new(cap).unwrap_or(NonZeroUsize::MIN)),
            wrap_hits: 0,
            wrap_misses: 0,
        }
    }

    pub fn with_box_metrics(mut self, boxes: BoxMetrics) -> Self {
        self.boxes = boxes;
        self
    }

    pub fn box_metrics(&self) -> &BoxMetrics {
        &self.boxes
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn wrap_hit_rate(&self) -> f64 {
        let total = self.wrap_hits + self.wrap_misses;
        if total == 0 {
            0.0
        } else {
            self.wrap_hits as f64 / total as f64
        }
    }

    /// Number of lines `text` wraps to within `width`.
    pub fn line_count(&mut self, text: &str, width: f32, font: FontSpec) -> usize {
        if text.is_empty() {
            return 0;
        }
        let key = WrapKey {
            text_hash: hash_text(text),
            width_q: (width.max(0.0) * 10.0).round() as u32,
            size_q: (font.size_px * 10.0).round().clamp(1.0, u16::MAX as f32) as u16,
            bold: font.bold,
        };
        if let Some(count) = self.wrap_cache.get(&key) {
            self.wrap_hits += 1;
            return *count;
        }
        self.wrap_misses += 1;
        let measurer = &self.measurer;
        let count = self.breaker.line_count(text, width, |s| measurer.measure(s, font));
        self.wrap_cache.put(key, count);
        count
    }

    fn block_height(&mut self, block: &BlockNode, width: f32) -> f32 {
        let boxes = self.boxes;
        match block {
            BlockNode::Text { content, style, .. } => {
                let font = FontSpec::new(style.font_px(), style.is_bold());
                let lines = self.line_count(content, width, font);
                lines as f32 * style.line_px() + boxes.block_gap_px
            }
            BlockNode::Figure { src, caption, width: css_width, .. } => {
                let display = css_width.to_px(width).clamp(0.0, width);
                let mut height = self.images.size_of(src).height_at(display);
                if let Some(caption) = caption {
                    height += boxes.caption_gap_px + self.caption_height(caption, width);
                }
                height + boxes.block_gap_px
            }
            BlockNode::Table { caption, columns, rows, .. } => {
                let mut height = 0.0;
                if let Some(caption) = caption {
                    height += self.caption_height(caption, width) + boxes.caption_gap_px;
                }
                let widths = column_widths(columns, width);
                let headers: Vec<&str> = columns.iter().map(|c| &*c.header).collect();
                height += self.row_height(&headers, &widths, true);
                for row in rows {
                    let cells: Vec<&str> = row.iter().map(|c| &**c).collect();
                    height += self.row_height(&cells, &widths, false);
                }
                // collapsed borders: one rule between rows plus the outer edge
                height += boxes.rule_px;
                height + boxes.block_gap_px
            }
            BlockNode::Divider { .. } => boxes.divider_px(),
            BlockNode::PageBreak { .. } | BlockNode::Empty => 0.0,
        }
    }

    fn caption_height(&mut self, caption: &str, width: f32) -> f32 {
        let font = FontSpec::new(self.boxes.caption_size_pt * PX_PER_PT, false);
        self.line_count(caption, width, font) as f32 * self.boxes.caption_line_px()
    }

    fn row_height(&mut self, cells: &[&str], widths: &[f32], header: bool) -> f32 {
        let boxes = self.boxes;
        let font = FontSpec::new(boxes.table_size_pt * PX_PER_PT, header);
        let inset = boxes.cell_padding_x_px * 2.0 + boxes.rule_px;
        let lines = cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| self.line_count(cell, (w - inset).max(1.0), font))
            .max()
            .unwrap_or(0)
            .max(1);
        lines as f32 * boxes.table_line_px() + boxes.cell_padding_y_px * 2.0 + boxes.rule_px
    }

    fn band_height(&self) -> f32 {
        self.boxes.band_px()
    }
}

impl LayoutSurface for FlowLayout {
    fn realize(&mut self, page: &PageNode) -> RealizedPage {
        let capacity = self.geometry.content_height_px();
        let width = self.geometry.content_width_px();
        let mut cursor = 0.0;
        if page.header.is_some() {
            cursor += self.band_height();
        }
        let mut blocks = Vec::with_capacity(page.blocks.len());
        // bottom margin of the previous box, which a divider's top margin collapses into
        let mut prev_margin = 0.0f32;
        for (index, block) in page.blocks.iter().enumerate() {
            let mut height = self.block_height(block, width);
            match block {
                BlockNode::Divider { .. } => {
                    height -= prev_margin.min(self.boxes.divider_margin_px);
                    prev_margin = self.boxes.divider_margin_px;
                }
                BlockNode::Text { .. } | BlockNode::Figure { .. } | BlockNode::Table { .. } => {
                    prev_margin = self.boxes.block_gap_px;
                }
                // empty boxes let margins collapse through them
                BlockNode::PageBreak { .. } | BlockNode::Empty => {}
            }
            blocks.push(RealizedBlock {
                block_id: block.block_id().map(SharedStr::from),
                top: cursor,
                height,
            });
            cursor += height;
            if matches!(block, BlockNode::PageBreak { .. }) && index + 1 < page.blocks.len() {
                cursor = next_page_start(cursor, capacity);
            }
        }
        if page.footer.is_some() {
            cursor += self.band_height();
        }
        tracing::trace!(
            page = %page.page_id,
            content_height = cursor,
            capacity,
            wrap_hit_rate = self.wrap_hit_rate(),
            "page realized"
        );
        RealizedPage {
            page_id: page.page_id.clone(),
            content_height: cursor,
            capacity,
            blocks,
        }
    }

    fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    fn set_geometry(&mut self, geometry: PageGeometry) {
        self.geometry = geometry;
    }

    fn image_loaded(&mut self, src: &str, width: f32, height: f32) -> bool {
        self.images.resolve(src, width, height)
    }
}

/// Content after a page break starts at the top of the next physical page.
fn next_page_start(cursor: f32, capacity: f32) -> f32 {
    if capacity <= 0.0 {
        return cursor;
    }
    ((cursor / capacity).floor() + 1.0) * capacity
}

/// Fixed table layout: declared widths first, the rest shared equally.
fn column_widths(columns: &[ColumnNode], total: f32) -> Vec<f32> {
    let declared: f32 = columns.iter().filter_map(|c| c.width).map(|w| w.to_px(total)).sum();
    let free = columns.iter().filter(|c| c.width.is_none()).count();
    let share = if free == 0 { 0.0 } else { (total - declared).max(0.0) / free as f32 };
    columns
        .iter()
        .map(|c| c.width.map(|w| w.to_px(total)).unwrap_or(share))
        .collect()
}

fn hash_text(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}
