use fontdue::{Font, FontSettings};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Synthetic emboldening widens glyph advances by this factor.
const BOLD_ADVANCE: f32 = 1.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    /// Font size in CSS pixels.
    pub size_px: f32,
    pub bold: bool,
}

impl FontSpec {
    pub fn new(size_px: f32, bold: bool) -> Self {
        Self { size_px, bold }
    }

    fn weight_factor(&self) -> f32 {
        if self.bold {
            BOLD_ADVANCE
        } else {
            1.0
        }
    }
}

pub trait TextMeasurer: Send + Sync {
    /// Advance width of `text` on a single line, in pixels.
    fn measure(&self, text: &str, font: FontSpec) -> f32;
}

#[derive(Debug, Default, Clone)]
pub struct SimpleMeasurer;

impl TextMeasurer for SimpleMeasurer {
    fn measure(&self, text: &str, font: FontSpec) -> f32 {
        let em = font.size_px * font.weight_factor();
        if text.is_ascii() {
            return text.len() as f32 * em * 0.55;
        }
        text.chars()
            .map(|ch| {
                if is_wide(ch) {
                    em
                } else if ch.is_ascii() {
                    em * 0.55
                } else {
                    em * 0.7
                }
            })
            .sum()
    }
}

fn is_wide(ch: char) -> bool {
    matches!(
        ch as u32,
        0x1100..=0x11FF
            | 0x3130..=0x318F
            | 0xAC00..=0xD7A3
            | 0x3000..=0x30FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xF900..=0xFAFF
            | 0xFF00..=0xFF60
            | 0x20000..=0x2CEAF
    )
}

#[derive(Clone)]
pub struct SharedMeasurer(pub Arc<dyn TextMeasurer>);

impl SharedMeasurer {
    pub fn new(measurer: impl TextMeasurer + 'static) -> Self {
        Self(Arc::new(measurer))
    }
}

impl TextMeasurer for SharedMeasurer {
    fn measure(&self, text: &str, font: FontSpec) -> f32 {
        self.0.measure(text, font)
    }
}

/// Fontdue-backed when a font file can be loaded, heuristic otherwise.
#[derive(Clone)]
pub enum RealMeasurer {
    Fontdue(FontdueMeasurer),
    Simple(SimpleMeasurer),
}

impl RealMeasurer {
    pub fn new() -> Self {
        let cap = if std::env::var("RD_LOW_SPEC").ok().as_deref() == Some("1") {
            1024
        } else {
            4096
        };
        match load_report_font() {
            Some(font) => RealMeasurer::Fontdue(FontdueMeasurer::new(font, cap)),
            None => {
                tracing::debug!("no report font found, using heuristic text metrics");
                RealMeasurer::Simple(SimpleMeasurer)
            }
        }
    }

    pub fn hit_rate(&self) -> Option<f64> {
        match self {
            RealMeasurer::Fontdue(m) => Some(m.hit_rate()),
            RealMeasurer::Simple(_) => None,
        }
    }
}

impl Default for RealMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for RealMeasurer {
    fn measure(&self, text: &str, font: FontSpec) -> f32 {
        match self {
            RealMeasurer::Fontdue(m) => m.measure(text, font),
            RealMeasurer::Simple(m) => m.measure(text, font),
        }
    }
}

fn load_report_font() -> Option<Font> {
    let configured = std::env::var("RD_FONT_PATH").ok();
    let candidates = configured.iter().map(String::as_str).chain([
        "/usr/share/fonts/truetype/noto/NotoSansKR-Regular.ttf",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/System/Library/Fonts/AppleSDGothicNeo.ttc",
        "C:\\Windows\\Fonts\\malgun.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]);
    for path in candidates {
        let Ok(bytes) = std::fs::read(path) else {
            continue;
        };
        match Font::from_bytes(bytes, FontSettings::default()) {
            Ok(font) => {
                tracing::debug!(path, "loaded report font");
                return Some(font);
            }
            Err(err) => tracing::warn!(path, err, "unreadable font file"),
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GlyphKey {
    ch: char,
    size: u16,
}

#[derive(Debug)]
struct GlyphCache {
    advances: LruCache<GlyphKey, f32>,
    hits: u64,
    misses: u64,
}

impl GlyphCache {
    fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(64)).unwrap_or(NonZeroUsize::MIN);
        Self { advances: LruCache::new(cap), hits: 0, misses: 0 }
    }

    fn advance(&mut self, key: GlyphKey, font: &Font) -> f32 {
        if let Some(hit) = self.advances.get(&key) {
            self.hits += 1;
            return *hit;
        }
        self.misses += 1;
        let advance = font.metrics(key.ch, key.size as f32).advance_width.max(0.0);
        self.advances.put(key, advance);
        advance
    }

    fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Clone)]
pub struct FontdueMeasurer {
    font: Arc<Font>,
    cache: Arc<Mutex<GlyphCache>>,
}

impl FontdueMeasurer {
    pub fn new(font: Font, cache_capacity: usize) -> Self {
        Self {
            font: Arc::new(font),
            cache: Arc::new(Mutex::new(GlyphCache::new(cache_capacity))),
        }
    }

    pub fn hit_rate(&self) -> f64 {
        self.cache.lock().map(|c| c.hit_rate()).unwrap_or(0.0)
    }
}

impl TextMeasurer for FontdueMeasurer {
    fn measure(&self, text: &str, font: FontSpec) -> f32 {
        let size = font.size_px.round().clamp(1.0, u16::MAX as f32) as u16;
        let mut cache = match self.cache.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        let width: f32 = text
            .chars()
            .map(|ch| cache.advance(GlyphKey { ch, size }, &self.font))
            .sum();
        width * font.weight_factor()
    }
}
