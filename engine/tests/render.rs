use kuchiki::traits::TendrilSink;
use kuchiki::NodeRef;
use proptest::prelude::*;
use rd_core::{
    import_json, CellValue, HorizontalAlign, ImageLayout, ReportBlock, ReportDocument, ReportPage, TableColumn,
    TableRow,
};
use rd_engine::{
    escape_html, render_block, render_static_document, render_static_page, render_visual_tree, BlockNode, CssLength,
    InteractiveTree, Justify, PageGeometry, StaticMarkup,
};
use std::sync::Arc;

const SAMPLE: &str = r#"{
  "id": "sample-20241022",
  "title": "Weekly <weather> report",
  "createdAt": "2024-10-22T00:00:00+09:00",
  "metadata": { "lang": "ko" },
  "pages": [
    {
      "id": "page-1",
      "header": { "left": "Weather", "right": "2024-10" },
      "blocks": [
        { "type": "text", "id": "intro-title", "content": "Overview", "style": { "size": 14, "weight": "bold", "align": "center" } },
        { "type": "image", "id": "main-map", "src": "https://example.com/map.png?a=1&b=2", "caption": "Figure 1", "layout": { "width": "80%", "align": "right" } },
        { "type": "image", "id": "bare-map", "src": "https://example.com/bare.png" },
        { "type": "table", "id": "summary", "caption": "Table 1",
          "columns": [ { "key": "region", "header": "Region", "width": "25%" }, { "key": "temp", "header": "Temp", "align": "right" } ],
          "rows": [ { "region": "North", "temp": "12.4" }, { "region": "South", "temp": 13 } ] },
        { "type": "pageBreak", "id": "break-1" }
      ]
    },
    {
      "id": "page-2",
      "footer": { "center": "- 2 -" },
      "blocks": [
        { "type": "divider", "id": "div-1", "variant": "dashed" },
        { "type": "text", "id": "closing", "content": "Line one\nLine two" },
        { "type": "chart", "id": "c-1" }
      ]
    }
  ]
}"#;

fn sample() -> ReportDocument {
    import_json(SAMPLE).unwrap()
}

fn parse(html: &str) -> NodeRef {
    kuchiki::parse_html().one(html)
}

/// Text of a node with `<br>` read back as newlines.
fn text_with_breaks(node: &NodeRef) -> String {
    let mut out = String::new();
    for child in node.children() {
        if let Some(text) = child.as_text() {
            out.push_str(&text.borrow());
        } else if let Some(element) = child.as_element() {
            if &*element.name.local == "br" {
                out.push('\n');
            } else {
                out.push_str(&text_with_breaks(&child));
            }
        }
    }
    out
}

fn attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()
        .and_then(|e| e.attributes.borrow().get(name).map(str::to_string))
}

fn text_block(content: &str) -> ReportBlock {
    ReportBlock::Text { id: Arc::from("t"), content: Arc::from(content), style: None }
}

#[test]
fn escapes_all_five_characters() {
    assert_eq!(escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
    assert!(matches!(escape_html("plain"), std::borrow::Cow::Borrowed(_)));
}

#[test]
fn text_defaults_and_line_breaks() {
    let html = render_block(&mut StaticMarkup, &text_block("Line one\nLine two"));
    assert!(html.contains("Line one<br />Line two"), "{}", html);
    assert!(html.contains("font-size:11pt;line-height:1.5;font-weight:normal;text-align:left"), "{}", html);
    match render_block(&mut InteractiveTree, &text_block("x")) {
        BlockNode::Text { style, .. } => {
            assert_eq!(style.size_pt, 11.0);
            assert_eq!(style.line_height, 1.5);
        }
        other => panic!("unexpected node {:?}", other),
    }
}

#[test]
fn table_with_missing_cells_renders_every_row() {
    let mut north = TableRow::new();
    north.insert(Arc::from("region"), CellValue::from("North"));
    let block = ReportBlock::Table {
        id: Arc::from("tbl"),
        columns: vec![TableColumn::new("region", "Region"), TableColumn::new("temp", "Temp")],
        rows: vec![north, TableRow::new()],
        caption: None,
    };

    let dom = parse(&render_block(&mut StaticMarkup, &block));
    let rows: Vec<Vec<String>> = dom
        .select("tbody tr")
        .unwrap()
        .map(|tr| tr.as_node().select("td").unwrap().map(|td| td.as_node().text_contents()).collect())
        .collect();
    assert_eq!(rows, vec![vec!["North".to_string(), String::new()], vec![String::new(), String::new()]]);
    assert!(dom.select_first(".report-table-caption").is_err());

    match render_block(&mut InteractiveTree, &block) {
        BlockNode::Table { rows, caption, .. } => {
            assert_eq!(caption, None);
            let rows: Vec<Vec<&str>> = rows.iter().map(|r| r.iter().map(|c| c.as_ref()).collect()).collect();
            assert_eq!(rows, vec![vec!["North", ""], vec!["", ""]]);
        }
        other => panic!("unexpected node {:?}", other),
    }
}

#[test]
fn both_targets_agree_on_the_sample() {
    let doc = sample();
    let tree = render_visual_tree(&doc);
    assert_eq!(tree.fingerprint, doc.fingerprint());

    for (page, node) in doc.pages.iter().zip(&tree.pages) {
        let dom = parse(&render_static_page(page));
        let section = dom.select_first(".report-page").unwrap();
        assert_eq!(attr(section.as_node(), "data-page-id").as_deref(), Some(node.page_id.as_ref()));
        assert_eq!(dom.select_first(".report-page-header").is_ok(), node.header.is_some());
        assert_eq!(dom.select_first(".report-page-footer").is_ok(), node.footer.is_some());

        for block in &node.blocks {
            let Some(id) = block.block_id() else { continue };
            let selector = format!("[data-block-id=\"{}\"]", id);
            let element = dom.select_first(&selector).unwrap();
            let element = element.as_node();
            match block {
                BlockNode::Text { content, style, .. } => {
                    assert_eq!(text_with_breaks(element), content.as_ref());
                    let css = attr(element, "style").unwrap();
                    assert!(css.contains(&format!("font-size:{}pt", style.size_pt)), "{}", css);
                    assert!(css.contains(&format!("line-height:{}", style.line_height)), "{}", css);
                }
                BlockNode::Figure { caption, width, justify, .. } => {
                    let figcaption = element.select("figcaption").unwrap().next();
                    assert_eq!(figcaption.map(|c| c.as_node().text_contents()), caption.as_ref().map(|c| c.to_string()));
                    let img = element.select_first("img").unwrap();
                    assert_eq!(attr(img.as_node(), "style").unwrap(), format!("width:{}", width));
                    assert!(attr(element, "style").unwrap().contains(justify.css()));
                }
                BlockNode::Table { caption, columns, rows, .. } => {
                    let headers: Vec<String> = element.select("th").unwrap().map(|th| th.as_node().text_contents()).collect();
                    let expected: Vec<String> = columns.iter().map(|c| c.header.to_string()).collect();
                    assert_eq!(headers, expected);
                    assert_eq!(element.select("tbody tr").unwrap().count(), rows.len());
                    let shown = element.select(".report-table-caption").unwrap().next().map(|c| c.as_node().text_contents());
                    assert_eq!(shown, caption.as_ref().map(|c| c.to_string()));
                }
                BlockNode::Divider { .. } | BlockNode::PageBreak { .. } | BlockNode::Empty => {}
            }
        }
    }
}

#[test]
fn image_layout_resolution() {
    let tree = render_visual_tree(&sample());
    let page = tree.page("page-1").unwrap();
    match page.block("main-map") {
        Some(BlockNode::Figure { width, justify, caption, .. }) => {
            assert_eq!(*width, CssLength::Percent(80.0));
            assert_eq!(*justify, Justify::End);
            assert_eq!(caption.as_deref(), Some("Figure 1"));
        }
        other => panic!("unexpected node {:?}", other),
    }
    match page.block("bare-map") {
        Some(BlockNode::Figure { width, justify, caption, .. }) => {
            assert_eq!(*width, CssLength::FULL);
            assert_eq!(*justify, Justify::Center);
            assert_eq!(*caption, None);
        }
        other => panic!("unexpected node {:?}", other),
    }
}

#[test]
fn unparseable_width_falls_back_in_both_targets() {
    let block = ReportBlock::Image {
        id: Arc::from("img"),
        src: Arc::from("a.png"),
        caption: Some(Arc::from("")),
        layout: Some(ImageLayout { width: Some(Arc::from("wide")), align: Some(HorizontalAlign::Left) }),
    };
    let html = render_block(&mut StaticMarkup, &block);
    assert!(html.contains("style=\"width:100%\""), "{}", html);
    assert!(html.contains("justify-content:flex-start"), "{}", html);
    assert!(!html.contains("figcaption"), "empty captions are not rendered: {}", html);
    match render_block(&mut InteractiveTree, &block) {
        BlockNode::Figure { width, caption, .. } => {
            assert_eq!(width, CssLength::FULL);
            assert_eq!(caption, None);
        }
        other => panic!("unexpected node {:?}", other),
    }
}

#[test]
fn non_length_column_widths_share_the_rest_in_both_targets() {
    let mut auto = TableColumn::new("a", "A");
    auto.width = Some(Arc::from("auto"));
    let mut calc = TableColumn::new("b", "B");
    calc.width = Some(Arc::from("calc(100% - 2em)"));
    let mut fixed = TableColumn::new("c", "C");
    fixed.width = Some(Arc::from("30%"));
    let block = ReportBlock::Table { id: Arc::from("tbl"), columns: vec![auto, calc, fixed], rows: Vec::new(), caption: None };

    let dom = parse(&render_block(&mut StaticMarkup, &block));
    let styles: Vec<String> = dom.select("th").unwrap().map(|th| attr(th.as_node(), "style").unwrap_or_default()).collect();
    assert_eq!(styles.len(), 3);
    assert!(!styles[0].contains("width"), "{}", styles[0]);
    assert!(!styles[1].contains("width"), "{}", styles[1]);
    assert!(styles[2].contains("width:30%"), "{}", styles[2]);

    match render_block(&mut InteractiveTree, &block) {
        BlockNode::Table { columns, .. } => {
            let widths: Vec<Option<CssLength>> = columns.iter().map(|c| c.width).collect();
            assert_eq!(widths, vec![None, None, Some(CssLength::Percent(30.0))]);
        }
        other => panic!("unexpected node {:?}", other),
    }
}

#[test]
fn css_lengths_parse() {
    assert_eq!("120px".parse::<CssLength>().unwrap(), CssLength::Px(120.0));
    assert_eq!(" 40mm ".parse::<CssLength>().unwrap(), CssLength::Mm(40.0));
    assert_eq!("2in".parse::<CssLength>().unwrap().to_px(0.0), 192.0);
    assert_eq!("50%".parse::<CssLength>().unwrap().to_px(600.0), 300.0);
    assert!("-5px".parse::<CssLength>().is_err());
    assert!("12em".parse::<CssLength>().is_err());
    assert!("".parse::<CssLength>().is_err());
}

#[test]
fn page_breaks_and_unsupported_blocks() {
    let tree = render_visual_tree(&sample());
    let first = tree.page("page-1").unwrap();
    let ids: Vec<&str> = first.selectable_block_ids().collect();
    assert_eq!(ids, vec!["intro-title", "main-map", "bare-map", "summary"]);
    assert!(!first.block("break-1").unwrap().is_selectable());

    let second = tree.page("page-2").unwrap();
    assert_eq!(second.blocks.last(), Some(&BlockNode::Empty));
    assert_eq!(render_block(&mut StaticMarkup, &ReportBlock::Unsupported), "");
}

#[test]
fn static_document_is_self_contained() {
    let html = render_static_document(&sample(), &PageGeometry::A4);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("@page { size: 210mm 297mm; margin: 18mm 16mm 20mm 16mm; }"), "{}", html);
    assert!(html.contains("<html lang=\"ko\">"));
    assert!(html.contains("<title>Weekly &lt;weather&gt; report</title>"));
    assert!(html.contains("map.png?a=1&amp;b=2"));
    assert!(!html.contains("<script"));
    assert!(!html.contains("<link"));

    let dom = parse(&html);
    assert_eq!(dom.select(".report-page").unwrap().count(), 2);
    assert_eq!(dom.select("hr.report-divider.dashed").unwrap().count(), 1);
}

#[test]
fn page_content_height_follows_geometry() {
    let letter = PageGeometry { width_mm: 216.0, height_mm: 279.0, ..PageGeometry::A4 };
    let html = render_static_document(&ReportDocument::new("t").with_pages([ReportPage::new("p")]), &letter);
    assert!(html.contains("size: 216mm 279mm"));
    assert!(html.contains(&format!("height: {}mm", letter.content_height_mm())));
}

proptest! {
    #[test]
    fn text_survives_static_markup(content in "[a-zA-Z0-9 <>&\"'\n]{0,40}") {
        let html = render_block(&mut StaticMarkup, &text_block(&content));
        let dom = parse(&html);
        let p = dom.select_first("p").unwrap();
        prop_assert_eq!(text_with_breaks(p.as_node()), content);
    }
}
