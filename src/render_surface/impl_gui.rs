use crate::library::logger::interface::Logger;
use crate::render_surface::interface::{Color, Rect, RenderSurface, Transform};
use eframe::egui;
use image::DynamicImage;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

pub type RenderFn =
    Box<dyn FnMut(&mut dyn RenderSurface) -> Result<(), Box<dyn Error + Send + Sync>> + Send>;

fn color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Paints into the central panel of the current egui frame.
pub struct RenderSurfaceGui<'a> {
    ctx: &'a egui::Context,
    painter: egui::Painter,
    origin: egui::Pos2,
    size: egui::Vec2,
    texture: &'a mut Option<egui::TextureHandle>,
}

impl<'a> RenderSurfaceGui<'a> {
    fn to_screen(&self, rect: Rect) -> egui::Rect {
        egui::Rect::from_min_size(
            self.origin + egui::vec2(rect.x, rect.y),
            egui::vec2(rect.width, rect.height),
        )
    }
}

impl<'a> RenderSurface for RenderSurfaceGui<'a> {
    fn size(&self) -> (f32, f32) {
        (self.size.x, self.size.y)
    }

    fn background(&mut self, color: Color) -> Result<(), Box<dyn Error + Send + Sync>> {
        let full = egui::Rect::from_min_size(self.origin, self.size);
        self.painter.rect_filled(full, 0.0, color32(color));
        Ok(())
    }

    fn draw_image(
        &mut self,
        frame: &DynamicImage,
        dest: Rect,
        transform: Transform,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let rgb = frame.to_rgb8();
        let image = egui::ColorImage::from_rgb(
            [rgb.width() as usize, rgb.height() as usize],
            rgb.as_raw(),
        );

        if let Some(texture) = self.texture.as_mut() {
            texture.set(image, egui::TextureOptions::LINEAR);
        } else {
            *self.texture = Some(self.ctx.load_texture(
                "video-frame",
                image,
                egui::TextureOptions::LINEAR,
            ));
        }
        let Some(texture) = self.texture.as_ref() else {
            return Ok(());
        };

        let left = transform.apply_x(dest.x).min(transform.apply_x(dest.x + dest.width));
        let target = self.to_screen(Rect { x: left, ..dest });
        let uv = if transform.is_mirrored() {
            egui::Rect::from_min_max(egui::pos2(1.0, 0.0), egui::pos2(0.0, 1.0))
        } else {
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0))
        };

        self.painter
            .image(texture.id(), target, uv, egui::Color32::WHITE);
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.painter
            .rect_filled(self.to_screen(rect), 0.0, color32(color));
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
        self.painter.text(
            self.origin + egui::vec2(x, y),
            egui::Align2::CENTER_BOTTOM,
            text,
            egui::FontId::proportional(size),
            color32(color),
        );
        Ok(())
    }
}

struct DisplayWindow {
    render: RenderFn,
    texture: Option<egui::TextureHandle>,
    refresh_interval: Duration,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl eframe::App for DisplayWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let area = ui.max_rect();
                let mut surface = RenderSurfaceGui {
                    ctx,
                    painter: ui.painter().clone(),
                    origin: area.min,
                    size: area.size(),
                    texture: &mut self.texture,
                };

                if let Err(e) = (self.render)(&mut surface) {
                    let _ = self.logger.error(&format!("Render failed: {}", e));
                }
            });

        ctx.request_repaint_after(self.refresh_interval);
    }
}

/// Open the window and block the calling thread until it is closed. The
/// window's repaint cadence drives `render`.
pub fn run_window(
    title: &str,
    width: f32,
    height: f32,
    refresh_interval: Duration,
    logger: Arc<dyn Logger + Send + Sync>,
    render: RenderFn,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_resizable(false),
        ..Default::default()
    };

    let window = DisplayWindow {
        render,
        texture: None,
        refresh_interval,
        logger: logger.with_namespace("display").with_namespace("gui"),
    };

    eframe::run_native(title, options, Box::new(|_cc| Box::new(window)))
        .map_err(|e| format!("Window failed: {}", e).into())
}
