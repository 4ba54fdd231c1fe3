use crate::device_camera::interface::DeviceCamera;
use crate::library::logger::interface::Logger;
use image::{imageops, DynamicImage};
use std::sync::{Arc, Mutex};

/// Serves one still image from disk as every frame.
pub struct DeviceCameraImageFile {
    path: String,
    logger: Arc<dyn Logger + Send + Sync>,
    frame: Mutex<Option<DynamicImage>>,
}

impl DeviceCameraImageFile {
    pub fn new(path: &str, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            path: path.to_string(),
            logger: logger.with_namespace("camera").with_namespace("image_file"),
            frame: Mutex::new(None),
        }
    }

    fn current(&self) -> Option<DynamicImage> {
        match self.frame.lock() {
            Ok(frame) => frame.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, frame: Option<DynamicImage>) {
        match self.frame.lock() {
            Ok(mut current) => *current = frame,
            Err(poisoned) => *poisoned.into_inner() = frame,
        }
    }
}

impl DeviceCamera for DeviceCameraImageFile {
    fn start(&self, width: u32, height: u32) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.logger.info(&format!("Loading frame from {}", self.path))?;
        let image = image::open(&self.path)?;
        let frame = image.resize_exact(width, height, imageops::FilterType::Triangle);
        self.replace(Some(frame));
        self.logger.info("Frame loaded")?;
        Ok(())
    }

    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.replace(None);
        Ok(())
    }

    fn has_metadata(&self) -> bool {
        self.current().is_some()
    }

    fn capture_frame(&self) -> Result<DynamicImage, Box<dyn std::error::Error + Send + Sync>> {
        self.current()
            .ok_or_else(|| format!("No frame loaded from {}", self.path).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_fake::LoggerFake;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_missing_file_never_becomes_ready() {
        let camera = DeviceCameraImageFile::new("./does/not/exist.png", Arc::new(LoggerFake::new()));

        assert!(camera.start(64, 48).is_err());
        assert!(!camera.has_metadata());
        assert!(camera.capture_frame().is_err());
    }

    #[test]
    fn test_frame_is_resized_to_capture_size() {
        let path = std::env::temp_dir().join("webcam_classifier_image_file_test.png");
        RgbImage::from_pixel(10, 10, Rgb([200, 10, 10])).save(&path).unwrap();
        let camera =
            DeviceCameraImageFile::new(path.to_str().unwrap(), Arc::new(LoggerFake::new()));

        camera.start(32, 24).unwrap();
        let frame = camera.capture_frame().unwrap();

        assert!(camera.has_metadata());
        assert_eq!((frame.width(), frame.height()), (32, 24));
        let _ = std::fs::remove_file(path);
    }
}
