use rd_core::{ReportBlock, ReportDocument, ReportPage};
use rd_engine::{measure_document, render_static_document, FlowLayout, PageGeometry, SimpleMeasurer};

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn main() {
    let _profiler = dhat::Profiler::new_heap();
    let doc = ReportDocument::new("Profile").with_pages((0..200).map(|p| {
        ReportPage::new(format!("page-{}", p))
            .with_blocks((0..10).map(|i| ReportBlock::text(format!("단락 {}: {}", i, "report text ".repeat(10)))))
    }));
    let markup = render_static_document(&doc, &PageGeometry::A4);
    let snapshot = measure_document(&mut FlowLayout::with_measurer(PageGeometry::A4, SimpleMeasurer), &doc);
    let json = serde_json::to_string(&doc).unwrap_or_default();
    println!("{} bytes of markup, {} pages measured, {} bytes of json", markup.len(), snapshot.pages.len(), json.len());
}
