use crate::{ReportDocument, SharedStr};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSelection {
    pub page_id: SharedStr,
    pub block_id: SharedStr,
}

impl BlockSelection {
    pub fn new(page_id: impl Into<SharedStr>, block_id: impl Into<SharedStr>) -> Self {
        Self { page_id: page_id.into(), block_id: block_id.into() }
    }

    /// First editable block on the first page, the editor's initial focus.
    pub fn initial(doc: &ReportDocument) -> Option<Self> {
        let page = doc.pages.first()?;
        let block = page.blocks.iter().find(|b| b.is_selectable())?;
        Some(Self::new(page.id.clone(), block.id()))
    }

    /// Whether the selection still points at an editable block of `doc`.
    pub fn resolves_in(&self, doc: &ReportDocument) -> bool {
        doc.find_block(&self.page_id, &self.block_id)
            .map_or(false, |b| b.is_selectable())
    }
}
