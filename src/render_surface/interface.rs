use image::DynamicImage;
use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const RED: Color = Color::rgba(255, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Horizontal affine transform applied to a blitted image: `x' = translate_x + scale_x * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate_x: f32,
    pub scale_x: f32,
}

impl Transform {
    /// Translate by the surface width, then flip x.
    pub fn mirror(width: f32) -> Self {
        Self {
            translate_x: width,
            scale_x: -1.0,
        }
    }

    pub fn apply_x(&self, x: f32) -> f32 {
        self.translate_x + self.scale_x * x
    }

    pub fn is_mirrored(&self) -> bool {
        self.scale_x < 0.0
    }
}

/// Drawing primitives the classification overlay needs. Each refresh tick
/// issues a full sequence of calls ending with `present`.
pub trait RenderSurface {
    /// Width and height in pixels.
    fn size(&self) -> (f32, f32);

    fn background(&mut self, color: Color) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Blit `frame` into `dest` after applying `transform` to its x axis.
    fn draw_image(
        &mut self,
        frame: &DynamicImage,
        dest: Rect,
        transform: Transform,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Draw `text` horizontally centered on `x` with its baseline at `y`.
    fn text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        color: Color,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn present(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_maps_x_to_width_minus_x() {
        let transform = Transform::mirror(640.0);

        assert_eq!(transform.apply_x(0.0), 640.0);
        assert_eq!(transform.apply_x(100.0), 540.0);
        assert_eq!(transform.apply_x(640.0), 0.0);
        assert!(transform.is_mirrored());
    }

    #[test]
    fn test_identity_keeps_x() {
        let identity = Transform {
            translate_x: 0.0,
            scale_x: 1.0,
        };

        assert_eq!(identity.apply_x(123.0), 123.0);
        assert!(!identity.is_mirrored());
    }
}
