use crate::{ReportBlock, ReportDocument, SharedStr};

/// Mutations an editor may request. Applying one never alters the input.
#[derive(Debug, Clone)]
pub enum EditCommand {
    ReplaceBlock { page_id: SharedStr, block: ReportBlock },
    InsertBlock { page_id: SharedStr, index: usize, block: ReportBlock },
    RemoveBlock { page_id: SharedStr, block_id: SharedStr },
}

impl EditCommand {
    pub fn apply(&self, doc: &ReportDocument) -> ReportDocument {
        match self {
            EditCommand::ReplaceBlock { page_id, block } => doc.replace_block(page_id, block.clone()),
            EditCommand::InsertBlock { page_id, index, block } => {
                doc.insert_block(page_id, *index, block.clone())
            }
            EditCommand::RemoveBlock { page_id, block_id } => doc.remove_block(page_id, block_id),
        }
    }

    pub fn page_id(&self) -> &str {
        match self {
            EditCommand::ReplaceBlock { page_id, .. }
            | EditCommand::InsertBlock { page_id, .. }
            | EditCommand::RemoveBlock { page_id, .. } => page_id,
        }
    }
}
