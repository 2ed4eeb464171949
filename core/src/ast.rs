use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

pub type SharedStr = Arc<str>;
pub type Metadata = BTreeMap<String, serde_json::Value>;
pub type TableRow = BTreeMap<SharedStr, CellValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SharedStr>,
    pub title: SharedStr,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
    pub pages: Vec<Arc<ReportPage>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPage {
    pub id: SharedStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<HeaderFooter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<HeaderFooter>,
    #[serde(deserialize_with = "blocks_lenient")]
    pub blocks: Vec<Arc<ReportBlock>>,
}

/// A block that fails to decode becomes `Unsupported` instead of failing
/// the whole document.
fn blocks_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Arc<ReportBlock>>, D::Error> {
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    let blocks = raw
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let block = ReportBlock::deserialize(value).unwrap_or_else(|err| {
                let id = value.get("id").and_then(serde_json::Value::as_str).unwrap_or("");
                tracing::warn!(index, block = id, %err, "malformed block treated as unsupported");
                ReportBlock::Unsupported
            });
            Arc::new(block)
        })
        .collect();
    Ok(blocks)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFooter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<SharedStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<SharedStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<SharedStr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReportBlock {
    Text {
        id: SharedStr,
        content: SharedStr,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<TextStyle>,
    },
    Image {
        id: SharedStr,
        src: SharedStr,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<SharedStr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        layout: Option<ImageLayout>,
    },
    Table {
        id: SharedStr,
        columns: Vec<TableColumn>,
        #[serde(default)]
        rows: Vec<TableRow>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<SharedStr>,
    },
    Divider {
        id: SharedStr,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variant: Option<DividerVariant>,
    },
    PageBreak {
        id: SharedStr,
        /// Anything besides the id. A well-formed page break has none.
        #[serde(flatten)]
        extra: BTreeMap<String, serde_json::Value>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<SharedStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<HorizontalAlign>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub key: SharedStr,
    pub header: SharedStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<SharedStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<HorizontalAlign>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(SharedStr),
    Number(f64),
    Bool(bool),
    Empty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DividerVariant {
    #[default]
    Solid,
    Dashed,
}

pub fn generate_id(prefix: &str) -> SharedStr {
    Arc::from(format!("{}-{}", prefix, Uuid::new_v4().simple()))
}

impl ReportDocument {
    pub fn new(title: impl Into<SharedStr>) -> Self {
        Self {
            id: Some(generate_id("report")),
            title: title.into(),
            created_at: Utc::now().into(),
            metadata: Metadata::new(),
            pages: Vec::new(),
        }
    }

    pub fn with_pages(mut self, pages: impl IntoIterator<Item = ReportPage>) -> Self {
        self.pages = pages.into_iter().map(Arc::new).collect();
        self
    }

    pub fn page(&self, page_id: &str) -> Option<&ReportPage> {
        self.pages.iter().map(|p| p.as_ref()).find(|p| p.id.as_ref() == page_id)
    }

    pub fn page_ids(&self) -> impl Iterator<Item = &SharedStr> + '_ {
        self.pages.iter().map(|p| &p.id)
    }

    /// File stem used when the document is delivered as a download.
    pub fn export_stem(&self) -> &str {
        match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => "report",
        }
    }
}

impl ReportPage {
    pub fn new(id: impl Into<SharedStr>) -> Self {
        Self {
            id: id.into(),
            header: None,
            footer: None,
            blocks: Vec::new(),
        }
    }

    pub fn with_blocks(mut self, blocks: impl IntoIterator<Item = ReportBlock>) -> Self {
        self.blocks = blocks.into_iter().map(Arc::new).collect();
        self
    }

    pub fn visible_header(&self) -> Option<&HeaderFooter> {
        self.header.as_ref().filter(|h| h.has_content())
    }

    pub fn visible_footer(&self) -> Option<&HeaderFooter> {
        self.footer.as_ref().filter(|f| f.has_content())
    }

    pub fn block(&self, block_id: &str) -> Option<&ReportBlock> {
        self.blocks
            .iter()
            .map(|b| b.as_ref())
            .find(|b| b.is_supported() && b.id() == block_id)
    }
}

impl HeaderFooter {
    pub fn has_content(&self) -> bool {
        self.slots().iter().any(|s| !s.is_empty())
    }

    /// Left, center and right text; missing slots are empty.
    pub fn slots(&self) -> [&str; 3] {
        [
            self.left.as_deref().unwrap_or(""),
            self.center.as_deref().unwrap_or(""),
            self.right.as_deref().unwrap_or(""),
        ]
    }
}

impl ReportBlock {
    pub fn text(content: impl Into<SharedStr>) -> Self {
        ReportBlock::Text {
            id: generate_id("text"),
            content: content.into(),
            style: None,
        }
    }

    pub fn image(src: impl Into<SharedStr>, caption: Option<SharedStr>) -> Self {
        ReportBlock::Image {
            id: generate_id("image"),
            src: src.into(),
            caption,
            layout: None,
        }
    }

    pub fn table(columns: Vec<TableColumn>, rows: Vec<TableRow>) -> Self {
        ReportBlock::Table {
            id: generate_id("table"),
            columns,
            rows,
            caption: None,
        }
    }

    pub fn divider() -> Self {
        ReportBlock::Divider {
            id: generate_id("divider"),
            variant: None,
        }
    }

    pub fn page_break() -> Self {
        ReportBlock::PageBreak {
            id: generate_id("break"),
            extra: BTreeMap::new(),
        }
    }

    /// Empty for `Unsupported`, which carries no identifier.
    pub fn id(&self) -> &str {
        match self {
            ReportBlock::Text { id, .. }
            | ReportBlock::Image { id, .. }
            | ReportBlock::Table { id, .. }
            | ReportBlock::Divider { id, .. }
            | ReportBlock::PageBreak { id, .. } => id,
            ReportBlock::Unsupported => "",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReportBlock::Text { .. } => "text",
            ReportBlock::Image { .. } => "image",
            ReportBlock::Table { .. } => "table",
            ReportBlock::Divider { .. } => "divider",
            ReportBlock::PageBreak { .. } => "pageBreak",
            ReportBlock::Unsupported => "unsupported",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, ReportBlock::Unsupported)
    }

    pub fn is_page_break(&self) -> bool {
        matches!(self, ReportBlock::PageBreak { .. })
    }

    /// Page breaks are layout markers and never offered to editors.
    pub fn is_selectable(&self) -> bool {
        self.is_supported() && !self.is_page_break()
    }
}

impl TableColumn {
    pub fn new(key: impl Into<SharedStr>, header: impl Into<SharedStr>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            width: None,
            align: None,
        }
    }
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Text(s) => s.is_empty(),
            CellValue::Empty => true,
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(Arc::from(value))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}
