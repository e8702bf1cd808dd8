use super::Color;

pub const DEFAULT_FONT_FAMILY: &str = "sans";
const TEXT_SIZE_MAX: u32 = 500;

/// Font face request: a registered family name and a pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSpec {
    pub family: String,
    pub size: u32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: u32) -> Self {
        Self {
            family: family.into(),
            size: clamp_text_size(size),
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_FAMILY, 24)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextOptions {
    pub color: Color,
    pub font: FontSpec,
}

impl TextOptions {
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_size(&mut self, size: u32) {
        self.font.size = clamp_text_size(size);
    }

    pub fn set_family(&mut self, family: impl Into<String>) {
        self.font.family = family.into();
    }
}

const fn clamp_text_size(size: u32) -> u32 {
    if size == 0 {
        1
    } else if size > TEXT_SIZE_MAX {
        TEXT_SIZE_MAX
    } else {
        size
    }
}
