mod geometry;
mod image;
mod layout;
mod linebreak;
mod measure;
mod metrics;
mod observer;
pub mod render;

pub use geometry::*;
pub use image::*;
pub use layout::*;
pub use linebreak::*;
pub use measure::*;
pub use metrics::*;
pub use observer::*;
pub use render::{
    escape_html, render_block, render_page, render_static_document, render_static_document_with,
    render_static_page, render_visual_tree, stylesheet, BlockNode, CssLength, InteractiveTree, Justify, PageNode,
    RenderTarget, ResolvedImage, ResolvedPage, ResolvedTable, ResolvedTextStyle, StaticMarkup, VisualTree,
};
