use proptest::prelude::*;
use rd_core::{validate, ReportBlock, ReportDocument, ReportPage, TextAlign, TextStyle};
use std::sync::Arc;

fn block_strategy() -> impl Strategy<Value = ReportBlock> {
    prop_oneof![
        ("[a-z ]{0,24}", proptest::option::of(8.0f32..24.0)).prop_map(|(content, size)| ReportBlock::Text {
            id: Arc::from("b"),
            content: Arc::from(content),
            style: size.map(|s| TextStyle { size: Some(s), align: Some(TextAlign::Center), ..TextStyle::default() }),
        }),
        Just(ReportBlock::Divider { id: Arc::from("b"), variant: None }),
        "[a-z]{1,8}".prop_map(|src| ReportBlock::Image {
            id: Arc::from("b"),
            src: Arc::from(format!("https://img/{}.png", src)),
            caption: None,
            layout: None,
        }),
    ]
}

fn document(blocks_per_page: usize, pages: usize) -> ReportDocument {
    let pages = (0..pages).map(|p| {
        ReportPage::new(format!("page-{}", p + 1)).with_blocks((0..blocks_per_page).map(|b| ReportBlock::Text {
            id: Arc::from(format!("b{}", b)),
            content: Arc::from(format!("block {} of page {}", b, p)),
            style: None,
        }))
    });
    ReportDocument::new("prop").with_pages(pages)
}

proptest! {
    #[test]
    fn generated_documents_validate_clean(blocks in 0usize..6, pages in 0usize..4) {
        prop_assert!(validate(&document(blocks, pages)).is_empty());
    }

    #[test]
    fn replace_block_is_idempotent(block in block_strategy(), page in 0usize..3) {
        let doc = document(3, 3);
        let page_id = format!("page-{}", page + 1);
        let block = match block {
            ReportBlock::Text { content, style, .. } => ReportBlock::Text { id: Arc::from("b1"), content, style },
            ReportBlock::Image { src, caption, layout, .. } => ReportBlock::Image { id: Arc::from("b1"), src, caption, layout },
            ReportBlock::Divider { variant, .. } => ReportBlock::Divider { id: Arc::from("b1"), variant },
            other => other,
        };
        let once = doc.replace_block(&page_id, block.clone());
        let twice = once.replace_block(&page_id, block.clone());
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.fingerprint(), twice.fingerprint());
        prop_assert_eq!(once.find_block(&page_id, "b1"), Some(&block));
    }
}
