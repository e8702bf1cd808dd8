use super::Color;

pub const BRUSH_SIZE_MIN: u32 = 1;
pub const BRUSH_SIZE_MAX: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushOptions {
    pub color: Color,
    pub size: u32,
}

impl Default for BrushOptions {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: 5,
        }
    }
}

impl BrushOptions {
    pub fn new(size: u32, color: Color) -> Self {
        let mut options = Self { color, size };
        options.set_size(size);
        options
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size.clamp(BRUSH_SIZE_MIN, BRUSH_SIZE_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brush_size_is_clamped_to_slider_range() {
        let mut options = BrushOptions::default();
        options.set_size(0);
        assert_eq!(options.size, BRUSH_SIZE_MIN);
        options.set_size(500);
        assert_eq!(options.size, BRUSH_SIZE_MAX);
        assert_eq!(BrushOptions::new(12, Color::RED).size, 12);
    }
}
