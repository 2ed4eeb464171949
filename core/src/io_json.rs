use crate::ReportDocument;
use serde::{Deserialize, Serialize};

pub fn export_json(doc: &ReportDocument) -> serde_json::Result<String> {
    serde_json::to_string_pretty(doc)
}

pub fn export_json_into(doc: &ReportDocument, buf: &mut Vec<u8>) -> serde_json::Result<()> {
    buf.clear();
    let blocks: usize = doc.pages.iter().map(|p| p.blocks.len()).sum();
    let target = blocks.saturating_mul(160) + 256;
    if buf.capacity() < target {
        buf.reserve(target - buf.capacity());
    }
    serde_json::to_writer(buf, doc)?;
    Ok(())
}

pub fn import_json(raw: &str) -> serde_json::Result<ReportDocument> {
    serde_json::from_str(raw)
}

/// Wire shape used at the rendering boundary: `{ "document": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub document: ReportDocument,
}

/// Accepts either a bare document or a `{ "document": ... }` payload.
pub fn import_payload(raw: &str) -> serde_json::Result<ReportDocument> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    match value.get("document") {
        Some(inner) if inner.is_object() => ReportDocument::deserialize(inner),
        _ => ReportDocument::deserialize(&value),
    }
}
