use crate::render_surface::interface::{Color, Rect, RenderSurface, Transform};
use image::DynamicImage;
use std::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Background(Color),
    Image {
        frame_width: u32,
        frame_height: u32,
        dest: Rect,
        transform: Transform,
    },
    FillRect(Rect, Color),
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        color: Color,
    },
    Present,
}

/// Records every draw call for inspection in tests.
pub struct RenderSurfaceFake {
    width: f32,
    height: f32,
    commands: Vec<DrawCommand>,
}

impl RenderSurfaceFake {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn texts(&self) -> Vec<String> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl RenderSurface for RenderSurfaceFake {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn background(&mut self, color: Color) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.commands.push(DrawCommand::Background(color));
        Ok(())
    }

    fn draw_image(
        &mut self,
        frame: &DynamicImage,
        dest: Rect,
        transform: Transform,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.commands.push(DrawCommand::Image {
            frame_width: frame.width(),
            frame_height: frame.height(),
            dest,
            transform,
        });
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.commands.push(DrawCommand::FillRect(rect, color));
        Ok(())
    }

    fn text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        color: Color,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            size,
            color,
        });
        Ok(())
    }

    fn present(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.commands.push(DrawCommand::Present);
        Ok(())
    }
}
