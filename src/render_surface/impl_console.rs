use crate::library::logger::interface::Logger;
use crate::render_surface::interface::{Color, Rect, RenderSurface, Transform};
use image::DynamicImage;
use std::error::Error;
use std::sync::Arc;

/// Headless surface: drops pixels and logs the caption whenever it changes.
pub struct RenderSurfaceConsole {
    width: f32,
    height: f32,
    logger: Arc<dyn Logger + Send + Sync>,
    pending: Vec<String>,
    last_caption: Option<String>,
}

impl RenderSurfaceConsole {
    pub fn new(width: f32, height: f32, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            width,
            height,
            logger: logger.with_namespace("display").with_namespace("console"),
            pending: Vec::new(),
            last_caption: None,
        }
    }

    #[cfg(test)]
    pub fn last_caption(&self) -> Option<&str> {
        self.last_caption.as_deref()
    }
}

impl RenderSurface for RenderSurfaceConsole {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn background(&mut self, _color: Color) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.pending.clear();
        Ok(())
    }

    fn draw_image(
        &mut self,
        _frame: &DynamicImage,
        _dest: Rect,
        _transform: Transform,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    fn fill_rect(&mut self, _rect: Rect, _color: Color) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    fn text(
        &mut self,
        text: &str,
        _x: f32,
        _y: f32,
        _size: f32,
        _color: Color,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.pending.push(text.to_string());
        Ok(())
    }

    fn present(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let caption = self.pending.join(" | ");
        self.pending.clear();

        if self.last_caption.as_deref() != Some(caption.as_str()) {
            self.logger.info(&caption)?;
            self.last_caption = Some(caption);
        }
        Ok(())
    }
}
