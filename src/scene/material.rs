//! Surface and line materials.

/// Linear RGB colour built from a `0xRRGGBB` hex value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn scaled(&self, intensity: f32) -> [f32; 4] {
        [self.r * intensity, self.g * intensity, self.b * intensity, 1.0]
    }

    pub fn with_alpha(&self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

/// Lit surface with an emissive term and optional transparency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongMaterial {
    pub color: Color,
    pub emissive: Color,
    pub opacity: f32,
    pub transparent: bool,
}

impl PhongMaterial {
    /// Opacity actually used when drawing.
    pub fn effective_opacity(&self) -> f32 {
        if self.transparent { self.opacity } else { 1.0 }
    }
}

/// Unlit colour for line segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMaterial {
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    Phong(PhongMaterial),
    Line(LineMaterial),
}
