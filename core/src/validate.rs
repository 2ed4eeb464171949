use crate::{ReportBlock, ReportDocument, SharedStr};
use serde::Serialize;
use std::collections::HashSet;

/// A broken structural invariant. Reported as data; nothing here aborts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StructuralIssue {
    #[error("page id `{page_id}` is used more than once")]
    #[serde(rename_all = "camelCase")]
    DuplicatePageId { page_id: SharedStr },

    #[error("block id `{block_id}` is used more than once on page `{page_id}`")]
    #[serde(rename_all = "camelCase")]
    DuplicateBlockId { page_id: SharedStr, block_id: SharedStr },

    #[error("column key `{key}` is declared more than once in table `{block_id}`")]
    #[serde(rename_all = "camelCase")]
    DuplicateColumnKey { page_id: SharedStr, block_id: SharedStr, key: SharedStr },

    #[error("row {row} of table `{block_id}` references undeclared column `{key}`")]
    #[serde(rename_all = "camelCase")]
    UndeclaredColumnKey { page_id: SharedStr, block_id: SharedStr, row: usize, key: SharedStr },

    #[error("page break `{block_id}` carries styling fields: {}", .fields.join(", "))]
    #[serde(rename_all = "camelCase")]
    StyledPageBreak { page_id: SharedStr, block_id: SharedStr, fields: Vec<String> },

    #[error("block {index} on page `{page_id}` has an unsupported type")]
    #[serde(rename_all = "camelCase")]
    UnsupportedBlock { page_id: SharedStr, index: usize },
}

impl StructuralIssue {
    /// The id or key the issue is about.
    pub fn identifier(&self) -> &str {
        match self {
            StructuralIssue::DuplicatePageId { page_id } => page_id,
            StructuralIssue::DuplicateBlockId { block_id, .. } => block_id,
            StructuralIssue::DuplicateColumnKey { key, .. } => key,
            StructuralIssue::UndeclaredColumnKey { key, .. } => key,
            StructuralIssue::StyledPageBreak { block_id, .. } => block_id,
            StructuralIssue::UnsupportedBlock { page_id, .. } => page_id,
        }
    }

    pub fn page_id(&self) -> &str {
        match self {
            StructuralIssue::DuplicatePageId { page_id }
            | StructuralIssue::DuplicateBlockId { page_id, .. }
            | StructuralIssue::DuplicateColumnKey { page_id, .. }
            | StructuralIssue::UndeclaredColumnKey { page_id, .. }
            | StructuralIssue::StyledPageBreak { page_id, .. }
            | StructuralIssue::UnsupportedBlock { page_id, .. } => page_id,
        }
    }
}

pub fn validate(doc: &ReportDocument) -> Vec<StructuralIssue> {
    let mut issues = Vec::new();
    let mut page_ids = HashSet::new();
    let mut reported_pages = HashSet::new();
    for page in &doc.pages {
        if !page_ids.insert(page.id.as_ref()) && reported_pages.insert(page.id.as_ref()) {
            issues.push(StructuralIssue::DuplicatePageId { page_id: page.id.clone() });
        }

        let mut block_ids = HashSet::new();
        let mut reported_blocks = HashSet::new();
        for (index, block) in page.blocks.iter().enumerate() {
            if !block.is_supported() {
                issues.push(StructuralIssue::UnsupportedBlock { page_id: page.id.clone(), index });
                continue;
            }
            let id = block.id();
            if !block_ids.insert(id) && reported_blocks.insert(id) {
                issues.push(StructuralIssue::DuplicateBlockId {
                    page_id: page.id.clone(),
                    block_id: SharedStr::from(id),
                });
            }
            validate_block(&page.id, block, &mut issues);
        }
    }
    issues
}

fn validate_block(page_id: &SharedStr, block: &ReportBlock, issues: &mut Vec<StructuralIssue>) {
    match block {
        ReportBlock::Table { id, columns, rows, .. } => {
            let mut keys = HashSet::new();
            for col in columns {
                if !keys.insert(col.key.as_ref()) {
                    issues.push(StructuralIssue::DuplicateColumnKey {
                        page_id: page_id.clone(),
                        block_id: id.clone(),
                        key: col.key.clone(),
                    });
                }
            }
            for (row_idx, row) in rows.iter().enumerate() {
                for key in row.keys() {
                    if !keys.contains(key.as_ref()) {
                        issues.push(StructuralIssue::UndeclaredColumnKey {
                            page_id: page_id.clone(),
                            block_id: id.clone(),
                            row: row_idx,
                            key: key.clone(),
                        });
                    }
                }
            }
        }
        ReportBlock::PageBreak { id, extra } if !extra.is_empty() => {
            issues.push(StructuralIssue::StyledPageBreak {
                page_id: page_id.clone(),
                block_id: id.clone(),
                fields: extra.keys().cloned().collect(),
            });
        }
        _ => {}
    }
}
