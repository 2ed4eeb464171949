use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rd_core::{export_json_into, CellValue, ReportBlock, ReportDocument, ReportPage, TableColumn, TableRow};
use rd_engine::{
    measure_document, render_static_document, render_visual_tree, FlowLayout, LineBreaker, PageGeometry,
    RealMeasurer, SimpleMeasurer, TextMeasurer, FontSpec,
};
use std::sync::Arc;

fn table(rows: usize) -> ReportBlock {
    let columns = vec![
        TableColumn::new("region", "Region"),
        TableColumn::new("units", "Units"),
        TableColumn::new("note", "Note"),
    ];
    let rows = (0..rows)
        .map(|i| {
            let mut row = TableRow::new();
            row.insert(Arc::from("region"), CellValue::Text(Arc::from(format!("Region {}", i))));
            row.insert(Arc::from("units"), CellValue::Number(i as f64 * 12.5));
            row.insert(Arc::from("note"), CellValue::Text(Arc::from("steady growth across all channels 판매")));
            row
        })
        .collect();
    ReportBlock::table(columns, rows)
}

fn build_report(pages: usize) -> ReportDocument {
    let paragraph = "Quarterly revenue grew in every region. 분기 매출은 모든 지역에서 증가했습니다.\n".repeat(4);
    ReportDocument::new("Benchmark report").with_pages((0..pages).map(|p| {
        ReportPage::new(format!("page-{}", p)).with_blocks([
            ReportBlock::text(format!("{} {}", p, paragraph)),
            ReportBlock::image("chart.png", Some(Arc::from("Figure 1"))),
            table(12),
            ReportBlock::divider(),
            ReportBlock::text(paragraph.clone()),
        ])
    }))
}

fn render_static_100_pages(c: &mut Criterion) {
    let doc = build_report(100);
    c.bench_function("render_static_100_pages", |b| b.iter(|| render_static_document(&doc, &PageGeometry::A4)));
}

fn visual_tree_100_pages(c: &mut Criterion) {
    let doc = build_report(100);
    c.bench_function("visual_tree_100_pages", |b| b.iter(|| render_visual_tree(&doc)));
}

fn measure_100_pages(c: &mut Criterion) {
    let doc = build_report(100);
    let mut layout = FlowLayout::with_measurer(PageGeometry::A4, SimpleMeasurer);
    c.bench_function("measure_100_pages", |b| b.iter(|| measure_document(&mut layout, &doc)));
}

fn measure_100_pages_real_fonts(c: &mut Criterion) {
    let doc = build_report(100);
    let mut layout = FlowLayout::new(PageGeometry::A4);
    c.bench_function("measure_100_pages_real_fonts", |b| b.iter(|| measure_document(&mut layout, &doc)));
}

fn wrap_10k_words(c: &mut Criterion) {
    let measurer = RealMeasurer::new();
    let font = FontSpec::new(14.67, false);
    let text = "word ".repeat(10_000);
    let breaker = LineBreaker;
    c.bench_function("wrap_10k_words", |b| {
        b.iter(|| breaker.wrap(&text, 672.0, |s| measurer.measure(s, font)).len())
    });
}

fn fingerprint_100_pages(c: &mut Criterion) {
    let doc = build_report(100);
    c.bench_function("fingerprint_100_pages", |b| b.iter(|| doc.fingerprint()));
}

fn edit_one_block(c: &mut Criterion) {
    let doc = build_report(100);
    let page = doc.pages[50].clone();
    let target = page.blocks[0].id().to_string();
    c.bench_function("edit_one_block", |b| {
        b.iter_batched(
            || ReportBlock::Text { id: Arc::from(target.as_str()), content: Arc::from("edited"), style: None },
            |block| doc.replace_block(&page.id, block),
            BatchSize::SmallInput,
        )
    });
}

fn serialize_json(c: &mut Criterion) {
    let doc = build_report(100);
    let mut buf = Vec::with_capacity(64 * 1024);
    c.bench_function("serialize_json", |b| {
        b.iter(|| {
            export_json_into(&doc, &mut buf).unwrap();
        })
    });
}

criterion_group!(
    benches,
    render_static_100_pages,
    visual_tree_100_pages,
    measure_100_pages,
    measure_100_pages_real_fonts,
    wrap_10k_words,
    fingerprint_100_pages,
    edit_one_block,
    serialize_json
);
criterion_main!(benches);
