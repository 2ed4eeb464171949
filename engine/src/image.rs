use std::collections::HashMap;

/// Intrinsic size assumed for an image until its real size is known.
pub const PLACEHOLDER_SIZE: ImageSize = ImageSize { width: 320.0, height: 180.0 };

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSize {
    pub width: f32,
    pub height: f32,
}

impl ImageSize {
    /// Height when scaled to `width`, keeping the aspect ratio.
    pub fn height_at(&self, width: f32) -> f32 {
        if self.width <= 0.0 {
            0.0
        } else {
            width * self.height / self.width
        }
    }
}

/// Intrinsic image sizes by source, as reported by whoever loads them.
#[derive(Debug, Default, Clone)]
pub struct ImageCache {
    entries: HashMap<String, ImageSize>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn size_of(&self, src: &str) -> ImageSize {
        self.entries.get(src).copied().unwrap_or(PLACEHOLDER_SIZE)
    }

    pub fn is_loaded(&self, src: &str) -> bool {
        self.entries.contains_key(src)
    }

    /// Records a loaded image. Returns true when the size differs from what
    /// layout assumed before, meaning earlier measurements are outdated.
    pub fn resolve(&mut self, src: &str, width: f32, height: f32) -> bool {
        let size = ImageSize { width: width.max(0.0), height: height.max(0.0) };
        let previous = self.entries.insert(src.to_string(), size);
        previous.unwrap_or(PLACEHOLDER_SIZE) != size
    }

    pub fn forget(&mut self, src: &str) -> bool {
        self.entries.remove(src).is_some()
    }
}
