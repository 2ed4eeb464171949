mod markup;
mod style;
mod stylesheet;
mod tree;

pub use markup::*;
pub use style::*;
pub use stylesheet::*;
pub use tree::*;

use rd_core::{DividerVariant, ReportBlock, ReportPage};

/// A rendering target. Both targets receive the same resolved values, so
/// defaults are decided once in `render_block`.
pub trait RenderTarget {
    type Block;
    type Page;

    fn text(&mut self, id: &str, content: &str, style: &ResolvedTextStyle) -> Self::Block;
    fn image(&mut self, id: &str, image: &ResolvedImage<'_>) -> Self::Block;
    fn table(&mut self, id: &str, table: &ResolvedTable<'_>) -> Self::Block;
    fn divider(&mut self, id: &str, variant: DividerVariant) -> Self::Block;
    fn page_break(&mut self, id: &str) -> Self::Block;
    /// Placeholder for blocks the target cannot render.
    fn empty(&mut self) -> Self::Block;
    fn page(&mut self, page: &ResolvedPage<'_>, blocks: Vec<Self::Block>) -> Self::Page;
}

pub fn render_block<T: RenderTarget + ?Sized>(target: &mut T, block: &ReportBlock) -> T::Block {
    match block {
        ReportBlock::Text { id, content, style } => {
            target.text(id, content, &ResolvedTextStyle::resolve(style.as_ref()))
        }
        ReportBlock::Image { id, src, caption, layout } => {
            let image = ResolvedImage::resolve(src, caption.as_deref(), layout.as_ref());
            target.image(id, &image)
        }
        ReportBlock::Table { id, columns, rows, caption } => {
            let table = ResolvedTable::resolve(columns, rows, caption.as_deref());
            target.table(id, &table)
        }
        ReportBlock::Divider { id, variant } => target.divider(id, variant.unwrap_or_default()),
        ReportBlock::PageBreak { id, .. } => target.page_break(id),
        ReportBlock::Unsupported => target.empty(),
    }
}

pub fn render_page<T: RenderTarget + ?Sized>(target: &mut T, page: &ReportPage) -> T::Page {
    let blocks = page
        .blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            if !block.is_supported() {
                tracing::warn!(page = %page.id, index, "unsupported block rendered empty");
            }
            render_block(target, block)
        })
        .collect();
    target.page(&ResolvedPage::resolve(page), blocks)
}
