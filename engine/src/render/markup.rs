use super::{render_page, stylesheet, RenderTarget, ResolvedImage, ResolvedPage, ResolvedTable, ResolvedTextStyle};
use crate::geometry::{BoxMetrics, PageGeometry};
use rd_core::{DividerVariant, FontWeight, HorizontalAlign, ReportDocument, TextAlign};
use std::borrow::Cow;
use std::fmt::Write;

/// Static target: self-contained HTML fragments for the PDF renderer.
#[derive(Debug, Default, Clone)]
pub struct StaticMarkup;

impl RenderTarget for StaticMarkup {
    type Block = String;
    type Page = String;

    fn text(&mut self, id: &str, content: &str, style: &ResolvedTextStyle) -> String {
        let mut out = String::with_capacity(content.len() + 160);
        out.push_str("<p class=\"report-block report-text\" data-block-id=\"");
        push_escaped(&mut out, id);
        let _ = write!(
            out,
            "\" style=\"font-size:{}pt;line-height:{};font-weight:{};text-align:{}\">",
            style.size_pt,
            style.line_height,
            weight_css(style.weight),
            text_align_css(style.align)
        );
        push_multiline(&mut out, content);
        out.push_str("</p>");
        out
    }

    fn image(&mut self, id: &str, image: &ResolvedImage<'_>) -> String {
        let mut out = String::with_capacity(image.src.len() + 200);
        out.push_str("<figure class=\"report-block report-figure\" data-block-id=\"");
        push_escaped(&mut out, id);
        let _ = write!(out, "\" style=\"justify-content:{}\"><img src=\"", image.justify.css());
        push_escaped(&mut out, image.src);
        out.push_str("\" alt=\"");
        push_escaped(&mut out, image.alt());
        let _ = write!(out, "\" style=\"width:{}\" />", image.width);
        if let Some(caption) = image.caption {
            out.push_str("<figcaption>");
            push_escaped(&mut out, caption);
            out.push_str("</figcaption>");
        }
        out.push_str("</figure>");
        out
    }

    fn table(&mut self, id: &str, table: &ResolvedTable<'_>) -> String {
        let mut out = String::with_capacity(256 + table.rows.len() * 64);
        out.push_str("<div class=\"report-block report-table\" data-block-id=\"");
        push_escaped(&mut out, id);
        out.push_str("\">");
        if let Some(caption) = table.caption {
            out.push_str("<div class=\"report-table-caption\">");
            push_escaped(&mut out, caption);
            out.push_str("</div>");
        }
        out.push_str("<table><thead><tr>");
        for column in &table.columns {
            out.push_str("<th style=\"");
            if let Some(width) = column.width {
                let _ = write!(out, "width:{};", width);
            }
            let _ = write!(out, "text-align:{}\">", align_css(column.align));
            push_escaped(&mut out, column.header);
            out.push_str("</th>");
        }
        out.push_str("</tr></thead><tbody>");
        for (index, row) in table.rows.iter().enumerate() {
            let _ = write!(out, "<tr data-row=\"{}\">", index);
            for (column, cell) in table.columns.iter().zip(row) {
                let _ = write!(out, "<td style=\"text-align:{}\">", align_css(column.align));
                push_escaped(&mut out, cell);
                out.push_str("</td>");
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table></div>");
        out
    }

    fn divider(&mut self, id: &str, variant: DividerVariant) -> String {
        let mut out = String::from("<hr class=\"report-block report-divider ");
        out.push_str(match variant {
            DividerVariant::Solid => "solid",
            DividerVariant::Dashed => "dashed",
        });
        out.push_str("\" data-block-id=\"");
        push_escaped(&mut out, id);
        out.push_str("\" />");
        out
    }

    fn page_break(&mut self, id: &str) -> String {
        let mut out = String::from("<div class=\"report-block report-page-break\" data-block-id=\"");
        push_escaped(&mut out, id);
        out.push_str("\" style=\"break-after:page;page-break-after:always\"></div>");
        out
    }

    fn empty(&mut self) -> String {
        String::new()
    }

    fn page(&mut self, page: &ResolvedPage<'_>, blocks: Vec<String>) -> String {
        let mut out = String::with_capacity(blocks.iter().map(String::len).sum::<usize>() + 256);
        out.push_str("<section class=\"report-page\" data-page-id=\"");
        push_escaped(&mut out, page.id);
        out.push_str("\">");
        if let Some(slots) = page.header {
            push_band(&mut out, "header", "report-page-header", slots);
        }
        out.push_str("<div class=\"report-page-content\">");
        for block in blocks {
            out.push_str(&block);
        }
        out.push_str("</div>");
        if let Some(slots) = page.footer {
            push_band(&mut out, "footer", "report-page-footer", slots);
        }
        out.push_str("</section>");
        out
    }
}

fn push_band(out: &mut String, tag: &str, class: &str, slots: [&str; 3]) {
    let _ = write!(out, "<{} class=\"{}\">", tag, class);
    for slot in slots {
        out.push_str("<span>");
        push_escaped(out, slot);
        out.push_str("</span>");
    }
    let _ = write!(out, "</{}>", tag);
}

fn weight_css(weight: FontWeight) -> &'static str {
    match weight {
        FontWeight::Normal => "normal",
        FontWeight::Bold => "bold",
    }
}

fn text_align_css(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Right => "right",
        TextAlign::Justify => "justify",
    }
}

fn align_css(align: HorizontalAlign) -> &'static str {
    match align {
        HorizontalAlign::Left => "left",
        HorizontalAlign::Center => "center",
        HorizontalAlign::Right => "right",
    }
}

/// Escapes `& < > " '` for use in text and attribute values.
pub fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 16);
    push_escaped(&mut out, input);
    Cow::Owned(out)
}

fn push_escaped(out: &mut String, input: &str) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

/// Escaped text with each `\n` turned into a line break element.
fn push_multiline(out: &mut String, input: &str) {
    let mut lines = input.split('\n');
    if let Some(first) = lines.next() {
        push_escaped(out, first);
    }
    for line in lines {
        out.push_str("<br />");
        push_escaped(out, line);
    }
}

pub fn render_static_page(page: &rd_core::ReportPage) -> String {
    render_page(&mut StaticMarkup, page)
}

pub fn render_static_document(doc: &ReportDocument, geometry: &PageGeometry) -> String {
    render_static_document_with(doc, geometry, &BoxMetrics::STANDARD)
}

/// Complete print document: embedded stylesheet, no scripts, no external
/// resources besides the image sources themselves.
pub fn render_static_document_with(doc: &ReportDocument, geometry: &PageGeometry, boxes: &BoxMetrics) -> String {
    let lang = doc
        .metadata
        .get("lang")
        .and_then(|v| v.as_str())
        .filter(|l| !l.is_empty())
        .unwrap_or("en");
    let mut target = StaticMarkup;
    let pages: Vec<String> = doc.pages.iter().map(|p| render_page(&mut target, p)).collect();
    let mut out = String::with_capacity(pages.iter().map(String::len).sum::<usize>() + 4096);
    out.push_str("<!DOCTYPE html>\n<html lang=\"");
    push_escaped(&mut out, lang);
    out.push_str("\">\n<head>\n<meta charset=\"utf-8\" />\n<title>");
    push_escaped(&mut out, &doc.title);
    out.push_str("</title>\n<style>\n");
    out.push_str(&stylesheet(geometry, boxes));
    out.push_str("</style>\n</head>\n<body>\n");
    for page in pages {
        out.push_str(&page);
        out.push('\n');
    }
    out.push_str("</body>\n</html>\n");
    out
}
