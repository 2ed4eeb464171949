use serde::{Deserialize, Serialize};

/// CSS reference pixels (96 dpi).
pub const PX_PER_MM: f32 = 96.0 / 25.4;
pub const PX_PER_PT: f32 = 96.0 / 72.0;

/// Physical page and margins. The interactive capacity and the static
/// `@page` rule are both derived from one value of this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_top_mm: f32,
    pub margin_right_mm: f32,
    pub margin_bottom_mm: f32,
    pub margin_left_mm: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width_mm: 210.0,
        height_mm: 297.0,
        margin_top_mm: 18.0,
        margin_right_mm: 16.0,
        margin_bottom_mm: 20.0,
        margin_left_mm: 16.0,
    };

    pub fn content_width_mm(&self) -> f32 {
        (self.width_mm - self.margin_left_mm - self.margin_right_mm).max(0.0)
    }

    pub fn content_height_mm(&self) -> f32 {
        (self.height_mm - self.margin_top_mm - self.margin_bottom_mm).max(0.0)
    }

    pub fn content_width_px(&self) -> f32 {
        self.content_width_mm() * PX_PER_MM
    }

    /// Page capacity used for overflow detection.
    pub fn content_height_px(&self) -> f32 {
        self.content_height_mm() * PX_PER_MM
    }

    pub fn page_rule(&self) -> String {
        format!(
            "@page {{ size: {}mm {}mm; margin: {}mm {}mm {}mm {}mm; }}",
            self.width_mm,
            self.height_mm,
            self.margin_top_mm,
            self.margin_right_mm,
            self.margin_bottom_mm,
            self.margin_left_mm
        )
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Box model constants shared by the embedded stylesheet and the flow layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxMetrics {
    pub block_gap_px: f32,
    pub caption_size_pt: f32,
    pub caption_line_height: f32,
    pub caption_gap_px: f32,
    pub table_size_pt: f32,
    pub table_line_height: f32,
    pub cell_padding_x_px: f32,
    pub cell_padding_y_px: f32,
    pub rule_px: f32,
    pub divider_margin_px: f32,
    pub band_size_pt: f32,
    pub band_line_height: f32,
    pub band_gap_px: f32,
}

impl BoxMetrics {
    pub const STANDARD: BoxMetrics = BoxMetrics {
        block_gap_px: 8.0,
        caption_size_pt: 9.0,
        caption_line_height: 1.4,
        caption_gap_px: 4.0,
        table_size_pt: 10.0,
        table_line_height: 1.4,
        cell_padding_x_px: 6.0,
        cell_padding_y_px: 4.0,
        rule_px: 1.0,
        divider_margin_px: 8.0,
        band_size_pt: 9.0,
        band_line_height: 1.4,
        band_gap_px: 8.0,
    };

    pub fn caption_line_px(&self) -> f32 {
        self.caption_size_pt * PX_PER_PT * self.caption_line_height
    }

    pub fn table_line_px(&self) -> f32 {
        self.table_size_pt * PX_PER_PT * self.table_line_height
    }

    /// Height of a header or footer band including its gap to the content.
    pub fn band_px(&self) -> f32 {
        self.band_size_pt * PX_PER_PT * self.band_line_height + self.band_gap_px
    }

    pub fn divider_px(&self) -> f32 {
        self.divider_margin_px * 2.0 + self.rule_px
    }
}

impl Default for BoxMetrics {
    fn default() -> Self {
        Self::STANDARD
    }
}
