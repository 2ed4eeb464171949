use crate::{ReportBlock, ReportDocument, ReportPage, SharedStr};
use std::sync::Arc;

// Every update returns a new document. Pages and blocks that are not touched
// keep their `Arc`, so older values stay valid snapshots.
impl ReportDocument {
    pub fn find_block(&self, page_id: &str, block_id: &str) -> Option<&ReportBlock> {
        self.page(page_id)?.block(block_id)
    }

    /// Swaps the block sharing `block`'s id on `page_id`. Unknown ids and
    /// page breaks leave the document as it was.
    pub fn replace_block(&self, page_id: &str, block: ReportBlock) -> ReportDocument {
        if !block.is_selectable() {
            tracing::debug!(page = page_id, kind = block.kind(), "replacement refused for non-editable block");
            return self.clone();
        }
        self.with_page(page_id, |page| {
            let pos = page
                .blocks
                .iter()
                .position(|b| b.is_supported() && b.id() == block.id())?;
            let current = &page.blocks[pos];
            if current.is_page_break() || current.as_ref() == &block {
                return None;
            }
            let mut next = page.clone();
            next.blocks[pos] = Arc::new(block);
            Some(next)
        })
    }

    pub fn insert_block(&self, page_id: &str, index: usize, block: ReportBlock) -> ReportDocument {
        if !block.is_supported() {
            return self.clone();
        }
        self.with_page(page_id, |page| {
            if page.block(block.id()).is_some() {
                tracing::debug!(page = page_id, block = block.id(), "insert skipped, id already present");
                return None;
            }
            let mut next = page.clone();
            let idx = index.min(next.blocks.len());
            next.blocks.insert(idx, Arc::new(block));
            Some(next)
        })
    }

    pub fn remove_block(&self, page_id: &str, block_id: &str) -> ReportDocument {
        self.with_page(page_id, |page| {
            let pos = page
                .blocks
                .iter()
                .position(|b| b.is_supported() && b.id() == block_id)?;
            let mut next = page.clone();
            next.blocks.remove(pos);
            Some(next)
        })
    }

    pub fn selectable_blocks(&self) -> impl Iterator<Item = (&SharedStr, &ReportBlock)> + '_ {
        self.pages.iter().flat_map(|page| {
            page.blocks
                .iter()
                .filter(|b| b.is_selectable())
                .map(move |b| (&page.id, b.as_ref()))
        })
    }

    fn with_page<F>(&self, page_id: &str, f: F) -> ReportDocument
    where
        F: FnOnce(&ReportPage) -> Option<ReportPage>,
    {
        let Some(pos) = self.pages.iter().position(|p| p.id.as_ref() == page_id) else {
            return self.clone();
        };
        match f(&self.pages[pos]) {
            Some(page) => {
                let mut next = self.clone();
                next.pages[pos] = Arc::new(page);
                next
            }
            None => self.clone(),
        }
    }
}
