use crate::geometry::{BoxMetrics, PageGeometry};
use std::fmt::Write;

/// Embedded stylesheet for static markup. Every box dimension the flow
/// layout assumes comes from `boxes`, so print output and measurement agree.
pub fn stylesheet(geometry: &PageGeometry, boxes: &BoxMetrics) -> String {
    let mut css = String::with_capacity(2048);
    let _ = writeln!(css, "{}", geometry.page_rule());
    css.push_str("html, body { margin: 0; padding: 0; background: #ffffff; }\n");
    css.push_str(
        "body { font-family: \"Noto Sans KR\", \"Noto Sans\", sans-serif; color: #111111; \
         -webkit-print-color-adjust: exact; print-color-adjust: exact; }\n",
    );
    let _ = writeln!(
        css,
        ".report-page {{ width: {}mm; height: {}mm; display: flex; flex-direction: column; \
         overflow: hidden; box-sizing: border-box; break-after: page; page-break-after: always; }}",
        geometry.content_width_mm(),
        geometry.content_height_mm()
    );
    css.push_str(".report-page:last-child { break-after: auto; page-break-after: auto; }\n");
    css.push_str(".report-page-content { flex: 1 1 auto; overflow: hidden; }\n");
    let _ = writeln!(
        css,
        ".report-page-header, .report-page-footer {{ display: flex; justify-content: space-between; \
         font-size: {}pt; line-height: {}; color: #555555; }}",
        boxes.band_size_pt, boxes.band_line_height
    );
    let _ = writeln!(css, ".report-page-header {{ margin-bottom: {}px; }}", boxes.band_gap_px);
    let _ = writeln!(css, ".report-page-footer {{ margin-top: {}px; }}", boxes.band_gap_px);
    let _ = writeln!(css, ".report-block {{ margin: 0 0 {}px; }}", boxes.block_gap_px);
    css.push_str(".report-text { white-space: normal; overflow-wrap: anywhere; }\n");
    css.push_str(".report-figure { display: flex; flex-wrap: wrap; }\n");
    css.push_str(".report-figure img { display: block; max-width: 100%; height: auto; }\n");
    let _ = writeln!(
        css,
        ".report-figure figcaption {{ flex-basis: 100%; margin-top: {}px; font-size: {}pt; \
         line-height: {}; text-align: center; }}",
        boxes.caption_gap_px, boxes.caption_size_pt, boxes.caption_line_height
    );
    let _ = writeln!(
        css,
        ".report-table-caption {{ margin-bottom: {}px; font-size: {}pt; line-height: {}; }}",
        boxes.caption_gap_px, boxes.caption_size_pt, boxes.caption_line_height
    );
    let _ = writeln!(
        css,
        ".report-table table {{ width: 100%; border-collapse: collapse; table-layout: fixed; \
         font-size: {}pt; line-height: {}; }}",
        boxes.table_size_pt, boxes.table_line_height
    );
    let _ = writeln!(
        css,
        ".report-table th, .report-table td {{ border: {}px solid #999999; padding: {}px {}px; \
         overflow-wrap: anywhere; vertical-align: top; }}",
        boxes.rule_px, boxes.cell_padding_y_px, boxes.cell_padding_x_px
    );
    css.push_str(".report-table th { font-weight: bold; background: #f3f3f3; }\n");
    let _ = writeln!(
        css,
        ".report-divider {{ height: 0; border: 0; border-top: {}px solid #999999; margin: {}px 0; }}",
        boxes.rule_px, boxes.divider_margin_px
    );
    css.push_str(".report-divider.dashed { border-top-style: dashed; }\n");
    css.push_str(".report-page-break { height: 0; margin: 0; }\n");
    css
}
