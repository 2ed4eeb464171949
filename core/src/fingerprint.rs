use crate::{CellValue, HeaderFooter, ReportBlock, ReportDocument, ReportPage, TextStyle};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

impl ReportDocument {
    /// Content hash over everything that can change rendered output.
    /// Metrics carry it so a consumer can tell whether they still describe
    /// the document at hand.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.title.as_ref().hash(&mut hasher);
        self.pages.len().hash(&mut hasher);
        for page in &self.pages {
            hash_page(page, &mut hasher);
        }
        hasher.finish()
    }
}

fn hash_page(page: &ReportPage, hasher: &mut impl Hasher) {
    page.id.as_ref().hash(hasher);
    hash_band(page.visible_header(), hasher);
    hash_band(page.visible_footer(), hasher);
    page.blocks.len().hash(hasher);
    for block in &page.blocks {
        hash_block(block, hasher);
    }
}

fn hash_band(band: Option<&HeaderFooter>, hasher: &mut impl Hasher) {
    match band {
        Some(band) => {
            true.hash(hasher);
            band.slots().hash(hasher);
        }
        None => false.hash(hasher),
    }
}

fn hash_block(block: &ReportBlock, hasher: &mut impl Hasher) {
    std::mem::discriminant(block).hash(hasher);
    block.id().hash(hasher);
    match block {
        ReportBlock::Text { content, style, .. } => {
            content.as_ref().hash(hasher);
            hash_style(style.as_ref(), hasher);
        }
        ReportBlock::Image { src, caption, layout, .. } => {
            src.as_ref().hash(hasher);
            caption.as_deref().hash(hasher);
            if let Some(layout) = layout {
                layout.width.as_deref().hash(hasher);
                layout.align.hash(hasher);
            }
        }
        ReportBlock::Table { columns, rows, caption, .. } => {
            caption.as_deref().hash(hasher);
            columns.len().hash(hasher);
            for col in columns {
                col.key.as_ref().hash(hasher);
                col.header.as_ref().hash(hasher);
                col.width.as_deref().hash(hasher);
                col.align.hash(hasher);
            }
            rows.len().hash(hasher);
            for row in rows {
                row.len().hash(hasher);
                for (key, value) in row {
                    key.as_ref().hash(hasher);
                    hash_cell(value, hasher);
                }
            }
        }
        ReportBlock::Divider { variant, .. } => variant.hash(hasher),
        ReportBlock::PageBreak { extra, .. } => {
            for key in extra.keys() {
                key.hash(hasher);
            }
        }
        ReportBlock::Unsupported => {}
    }
}

fn hash_style(style: Option<&TextStyle>, hasher: &mut impl Hasher) {
    let Some(style) = style else {
        0u8.hash(hasher);
        return;
    };
    1u8.hash(hasher);
    style.align.hash(hasher);
    style.weight.hash(hasher);
    style.size.map(f32::to_bits).hash(hasher);
    style.line_height.map(f32::to_bits).hash(hasher);
}

fn hash_cell(value: &CellValue, hasher: &mut impl Hasher) {
    std::mem::discriminant(value).hash(hasher);
    match value {
        CellValue::Text(s) => s.as_ref().hash(hasher),
        CellValue::Number(n) => n.to_bits().hash(hasher),
        CellValue::Bool(b) => b.hash(hasher),
        CellValue::Empty => {}
    }
}
