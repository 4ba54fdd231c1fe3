use crate::classification_loop::core::{ClassificationState, Model};
use crate::config::Config;
use crate::device_camera::interface::DeviceCamera;
use crate::render_surface::interface::{Color, Rect, RenderSurface, Transform};
use std::error::Error;
use std::sync::Arc;

const CAPTION_BAR_COLOR: Color = Color::rgba(0, 0, 0, 180);
const CAPTION_TEXT_SIZE: f32 = 24.0;
const HINT_TEXT_SIZE: f32 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub text: String,
    pub hint: Option<String>,
}

pub fn caption(model: &Model) -> Caption {
    let text = match (&model.state, &model.prediction) {
        (ClassificationState::Loading, _) => "Loading model and camera...".to_string(),
        (ClassificationState::WaitingForVideo, _) => "Waiting for video...".to_string(),
        (ClassificationState::Error(e), _) => {
            return Caption {
                text: format!("Error: {}", e),
                hint: Some("Check the logs for details".to_string()),
            };
        }
        (ClassificationState::Ready | ClassificationState::Classifying, Some(prediction)) => {
            prediction.caption()
        }
        (ClassificationState::Ready | ClassificationState::Classifying, None) => {
            "Classifying...".to_string()
        }
    };

    Caption { text, hint: None }
}

#[derive(Clone)]
pub struct Render {
    config: Config,
    device_camera: Arc<dyn DeviceCamera + Send + Sync>,
}

impl Render {
    pub fn new(config: Config, device_camera: Arc<dyn DeviceCamera + Send + Sync>) -> Self {
        Self {
            config,
            device_camera,
        }
    }

    pub fn render(
        &self,
        surface: &mut dyn RenderSurface,
        model: &Model,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let (width, height) = surface.size();

        surface.background(Color::BLACK)?;

        // A capture without a frame yet just skips this tick's video.
        if self.device_camera.has_metadata() {
            if let Ok(frame) = self.device_camera.capture_frame() {
                let dest = Rect {
                    x: 0.0,
                    y: 0.0,
                    width,
                    height,
                };
                surface.draw_image(&frame, dest, Transform::mirror(width))?;
            }
        }

        let bar_height = self.config.caption_bar_height;
        surface.fill_rect(
            Rect {
                x: 0.0,
                y: height - bar_height,
                width,
                height: bar_height,
            },
            CAPTION_BAR_COLOR,
        )?;

        let caption = caption(model);
        match &caption.hint {
            Some(hint) => {
                surface.text(
                    &caption.text,
                    width / 2.0,
                    height - 20.0,
                    CAPTION_TEXT_SIZE,
                    Color::WHITE,
                )?;
                surface.text(hint, width / 2.0, height - 5.0, HINT_TEXT_SIZE, Color::RED)?;
            }
            None => {
                surface.text(
                    &caption.text,
                    width / 2.0,
                    height - 18.0,
                    CAPTION_TEXT_SIZE,
                    Color::WHITE,
                )?;
            }
        }

        surface.present()
    }
}
