use super::{render_page, CssLength, Justify, RenderTarget, ResolvedImage, ResolvedPage, ResolvedTable, ResolvedTextStyle};
use rd_core::{DividerVariant, HorizontalAlign, ReportDocument, SharedStr};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnNode {
    pub key: SharedStr,
    pub header: SharedStr,
    pub width: Option<CssLength>,
    pub align: HorizontalAlign,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockNode {
    Text {
        id: SharedStr,
        content: SharedStr,
        style: ResolvedTextStyle,
    },
    Figure {
        id: SharedStr,
        src: SharedStr,
        caption: Option<SharedStr>,
        width: CssLength,
        justify: Justify,
    },
    Table {
        id: SharedStr,
        caption: Option<SharedStr>,
        columns: Vec<ColumnNode>,
        rows: Vec<Vec<SharedStr>>,
    },
    Divider {
        id: SharedStr,
        variant: DividerVariant,
    },
    PageBreak {
        id: SharedStr,
    },
    Empty,
}

impl BlockNode {
    pub fn block_id(&self) -> Option<&str> {
        match self {
            BlockNode::Text { id, .. }
            | BlockNode::Figure { id, .. }
            | BlockNode::Table { id, .. }
            | BlockNode::Divider { id, .. }
            | BlockNode::PageBreak { id } => Some(&**id),
            BlockNode::Empty => None,
        }
    }

    pub fn is_selectable(&self) -> bool {
        !matches!(self, BlockNode::PageBreak { .. } | BlockNode::Empty)
    }

    pub fn caption(&self) -> Option<&str> {
        match self {
            BlockNode::Figure { caption, .. } | BlockNode::Table { caption, .. } => caption.as_deref(),
            _ => None,
        }
    }

    pub fn text_style(&self) -> Option<&ResolvedTextStyle> {
        match self {
            BlockNode::Text { style, .. } => Some(style),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageNode {
    pub page_id: SharedStr,
    pub header: Option<[SharedStr; 3]>,
    pub footer: Option<[SharedStr; 3]>,
    pub blocks: Vec<BlockNode>,
}

impl PageNode {
    pub fn selectable_block_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.blocks
            .iter()
            .filter(|b| b.is_selectable())
            .filter_map(BlockNode::block_id)
    }

    pub fn block(&self, block_id: &str) -> Option<&BlockNode> {
        self.blocks.iter().find(|b| b.block_id() == Some(block_id))
    }
}

/// Interactive view of a whole document, tagged with the fingerprint of the
/// document it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualTree {
    pub fingerprint: u64,
    pub pages: Vec<PageNode>,
}

impl VisualTree {
    pub fn page(&self, page_id: &str) -> Option<&PageNode> {
        self.pages.iter().find(|p| p.page_id.as_ref() == page_id)
    }
}

/// Interactive target: builds inspectable nodes for an editor and a layout surface.
#[derive(Debug, Default, Clone)]
pub struct InteractiveTree;

impl RenderTarget for InteractiveTree {
    type Block = BlockNode;
    type Page = PageNode;

    fn text(&mut self, id: &str, content: &str, style: &ResolvedTextStyle) -> BlockNode {
        BlockNode::Text { id: Arc::from(id), content: Arc::from(content), style: *style }
    }

    fn image(&mut self, id: &str, image: &ResolvedImage<'_>) -> BlockNode {
        BlockNode::Figure {
            id: Arc::from(id),
            src: Arc::from(image.src),
            caption: image.caption.map(Arc::from),
            width: image.width,
            justify: image.justify,
        }
    }

    fn table(&mut self, id: &str, table: &ResolvedTable<'_>) -> BlockNode {
        BlockNode::Table {
            id: Arc::from(id),
            caption: table.caption.map(Arc::from),
            columns: table
                .columns
                .iter()
                .map(|c| ColumnNode {
                    key: Arc::from(c.key),
                    header: Arc::from(c.header),
                    width: c.width,
                    align: c.align,
                })
                .collect(),
            rows: table
                .rows
                .iter()
                .map(|row| row.iter().map(|cell| SharedStr::from(&**cell)).collect())
                .collect(),
        }
    }

    fn divider(&mut self, id: &str, variant: DividerVariant) -> BlockNode {
        BlockNode::Divider { id: Arc::from(id), variant }
    }

    fn page_break(&mut self, id: &str) -> BlockNode {
        BlockNode::PageBreak { id: Arc::from(id) }
    }

    fn empty(&mut self) -> BlockNode {
        BlockNode::Empty
    }

    fn page(&mut self, page: &ResolvedPage<'_>, blocks: Vec<BlockNode>) -> PageNode {
        PageNode {
            page_id: Arc::from(page.id),
            header: page.header.map(|slots| slots.map(Arc::from)),
            footer: page.footer.map(|slots| slots.map(Arc::from)),
            blocks,
        }
    }
}

pub fn render_visual_tree(doc: &ReportDocument) -> VisualTree {
    let mut target = InteractiveTree;
    VisualTree {
        fingerprint: doc.fingerprint(),
        pages: doc.pages.iter().map(|p| render_page(&mut target, p)).collect(),
    }
}
