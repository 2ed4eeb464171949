use crate::geometry::{PX_PER_MM, PX_PER_PT};
use rd_core::{CellValue, FontWeight, HeaderFooter, HorizontalAlign, ImageLayout, ReportPage, TableColumn, TableRow, TextAlign, TextStyle};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_FONT_SIZE_PT: f32 = 11.0;
pub const DEFAULT_LINE_HEIGHT: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTextStyle {
    pub size_pt: f32,
    pub line_height: f32,
    pub weight: FontWeight,
    pub align: TextAlign,
}

impl ResolvedTextStyle {
    pub fn resolve(style: Option<&TextStyle>) -> Self {
        let style = style.copied().unwrap_or_default();
        Self {
            size_pt: positive(style.size).unwrap_or(DEFAULT_FONT_SIZE_PT),
            line_height: positive(style.line_height).unwrap_or(DEFAULT_LINE_HEIGHT),
            weight: style.weight.unwrap_or_default(),
            align: style.align.unwrap_or_default(),
        }
    }

    pub fn font_px(&self) -> f32 {
        self.size_pt * PX_PER_PT
    }

    pub fn line_px(&self) -> f32 {
        self.font_px() * self.line_height
    }

    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }
}

impl Default for ResolvedTextStyle {
    fn default() -> Self {
        Self::resolve(None)
    }
}

fn positive(value: Option<f32>) -> Option<f32> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Main-axis placement of a figure within the content width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Start,
    Center,
    End,
}

impl Justify {
    pub fn css(&self) -> &'static str {
        match self {
            Justify::Start => "flex-start",
            Justify::Center => "center",
            Justify::End => "flex-end",
        }
    }
}

impl From<HorizontalAlign> for Justify {
    fn from(align: HorizontalAlign) -> Self {
        match align {
            HorizontalAlign::Left => Justify::Start,
            HorizontalAlign::Center => Justify::Center,
            HorizontalAlign::Right => Justify::End,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("not a css length: {0:?}")]
pub struct ParseLengthError(pub Box<str>);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CssLength {
    Percent(f32),
    Px(f32),
    Mm(f32),
    In(f32),
    Pt(f32),
}

impl CssLength {
    pub const FULL: CssLength = CssLength::Percent(100.0);

    /// Parses `value`, falling back to 100% when it is not a length.
    pub fn parse_or_full(value: Option<&str>) -> CssLength {
        value.and_then(|v| v.parse().ok()).unwrap_or(CssLength::FULL)
    }

    /// Pixel size against the containing block width.
    pub fn to_px(&self, reference_px: f32) -> f32 {
        match *self {
            CssLength::Percent(v) => reference_px * v / 100.0,
            CssLength::Px(v) => v,
            CssLength::Mm(v) => v * PX_PER_MM,
            CssLength::In(v) => v * 96.0,
            CssLength::Pt(v) => v * PX_PER_PT,
        }
    }
}

impl FromStr for CssLength {
    type Err = ParseLengthError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim();
        let split = value
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(value.len());
        let (number, unit) = value.split_at(split);
        let err = || ParseLengthError(raw.into());
        let number: f32 = number.parse().map_err(|_| err())?;
        if !number.is_finite() {
            return Err(err());
        }
        match unit.to_ascii_lowercase().as_str() {
            "%" => Ok(CssLength::Percent(number)),
            "px" => Ok(CssLength::Px(number)),
            "mm" => Ok(CssLength::Mm(number)),
            "in" => Ok(CssLength::In(number)),
            "pt" => Ok(CssLength::Pt(number)),
            // unitless zero is the only bare number CSS accepts
            "" if number == 0.0 => Ok(CssLength::Px(0.0)),
            _ => Err(err()),
        }
    }
}

impl fmt::Display for CssLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssLength::Percent(v) => write!(f, "{}%", v),
            CssLength::Px(v) => write!(f, "{}px", v),
            CssLength::Mm(v) => write!(f, "{}mm", v),
            CssLength::In(v) => write!(f, "{}in", v),
            CssLength::Pt(v) => write!(f, "{}pt", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImage<'a> {
    pub src: &'a str,
    pub caption: Option<&'a str>,
    pub width: CssLength,
    pub justify: Justify,
}

impl<'a> ResolvedImage<'a> {
    pub fn resolve(src: &'a str, caption: Option<&'a str>, layout: Option<&'a ImageLayout>) -> Self {
        Self {
            src,
            caption: present(caption),
            width: CssLength::parse_or_full(layout.and_then(|l| l.width.as_deref())),
            justify: layout
                .and_then(|l| l.align)
                .unwrap_or(HorizontalAlign::Center)
                .into(),
        }
    }

    pub fn alt(&self) -> &'a str {
        self.caption.unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumn<'a> {
    pub key: &'a str,
    pub header: &'a str,
    pub width: Option<CssLength>,
    pub align: HorizontalAlign,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTable<'a> {
    pub caption: Option<&'a str>,
    pub columns: Vec<ResolvedColumn<'a>>,
    /// Cell text per row, in declared column order.
    pub rows: Vec<Vec<Cow<'a, str>>>,
}

impl<'a> ResolvedTable<'a> {
    pub fn resolve(columns: &'a [TableColumn], rows: &'a [TableRow], caption: Option<&'a str>) -> Self {
        let columns: Vec<ResolvedColumn<'a>> = columns
            .iter()
            .map(|c| ResolvedColumn {
                key: &c.key,
                header: &c.header,
                width: c.width.as_deref().and_then(|w| column_width(&c.key, w)),
                align: c.align.unwrap_or_default(),
            })
            .collect();
        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|col| row.get(col.key).map(cell_text).unwrap_or(Cow::Borrowed("")))
                    .collect()
            })
            .collect();
        Self { caption: present(caption), columns, rows }
    }
}

/// Only lengths are honored; `auto`, `calc(...)` and the like leave the
/// column to share the remaining width.
fn column_width(key: &str, raw: &str) -> Option<CssLength> {
    match raw.parse() {
        Ok(width) => Some(width),
        Err(err) => {
            tracing::debug!(column = key, %err, "column width ignored");
            None
        }
    }
}

fn cell_text(value: &CellValue) -> Cow<'_, str> {
    match value {
        CellValue::Text(s) => Cow::Borrowed(s),
        CellValue::Empty => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPage<'a> {
    pub id: &'a str,
    pub header: Option<[&'a str; 3]>,
    pub footer: Option<[&'a str; 3]>,
}

impl<'a> ResolvedPage<'a> {
    pub fn resolve(page: &'a ReportPage) -> Self {
        Self {
            id: &page.id,
            header: page.visible_header().map(HeaderFooter::slots),
            footer: page.visible_footer().map(HeaderFooter::slots),
        }
    }
}

/// Captions render only when non-empty.
fn present(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.is_empty())
}
