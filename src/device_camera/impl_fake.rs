use crate::device_camera::interface::DeviceCamera;
use crate::library::logger::interface::Logger;
use image::{DynamicImage, Rgb, RgbImage};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

const SQUARE_SIZE: u32 = 40;

#[derive(Clone, Copy)]
struct Session {
    width: u32,
    height: u32,
    started_at: Instant,
}

/// Synthetic camera: a bright square sweeping left to right over dim noise.
pub struct DeviceCameraFake {
    logger: Arc<dyn Logger + Send + Sync>,
    warmup: Duration,
    session: Mutex<Option<Session>>,
    frame_count: AtomicU64,
}

impl DeviceCameraFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>, warmup: Duration) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("fake"),
            warmup,
            session: Mutex::new(None),
            frame_count: AtomicU64::new(0),
        }
    }

    #[cfg(test)]
    pub fn is_started(&self) -> bool {
        self.session().is_some()
    }

    fn session(&self) -> Option<Session> {
        match self.session.lock() {
            Ok(session) => *session,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_session(&self, session: Option<Session>) {
        match self.session.lock() {
            Ok(mut current) => *current = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }
}

impl DeviceCamera for DeviceCameraFake {
    fn start(&self, width: u32, height: u32) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.logger
            .info(&format!("Starting camera at {}x{}...", width, height))?;
        self.set_session(Some(Session {
            width,
            height,
            started_at: Instant::now(),
        }));
        Ok(())
    }

    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.logger.info("Stopping camera...")?;
        self.set_session(None);
        Ok(())
    }

    fn has_metadata(&self) -> bool {
        self.session()
            .map(|session| session.started_at.elapsed() >= self.warmup)
            .unwrap_or(false)
    }

    fn capture_frame(&self) -> Result<DynamicImage, Box<dyn std::error::Error + Send + Sync>> {
        let session = match self.session() {
            Some(session) if self.has_metadata() => session,
            Some(_) => return Err("Camera is still warming up".into()),
            None => return Err("Camera is not started".into()),
        };

        let frame_index = self.frame_count.fetch_add(1, Ordering::Relaxed);
        let travel = session.width.saturating_sub(SQUARE_SIZE).max(1) as u64;
        let square_x = (frame_index * 4 % travel) as u32;
        let square_y = session.height.saturating_sub(SQUARE_SIZE) / 2;

        let mut rng = rand::rng();
        let frame = RgbImage::from_fn(session.width, session.height, |x, y| {
            let inside = x >= square_x
                && x < square_x + SQUARE_SIZE
                && y >= square_y
                && y < square_y + SQUARE_SIZE;
            if inside {
                Rgb([255, 255, 255])
            } else {
                let noise = rng.random_range(0..40u8);
                Rgb([noise, noise, noise])
            }
        });

        Ok(DynamicImage::ImageRgb8(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_fake::LoggerFake;

    #[test]
    fn test_capture_before_start_fails() {
        let camera = DeviceCameraFake::new(Arc::new(LoggerFake::new()), Duration::ZERO);

        assert!(!camera.has_metadata());
        assert!(camera.capture_frame().is_err());
    }

    #[test]
    fn test_capture_after_start_has_requested_size() {
        let camera = DeviceCameraFake::new(Arc::new(LoggerFake::new()), Duration::ZERO);
        camera.start(64, 48).unwrap();

        let frame = camera.capture_frame().unwrap();

        assert!(camera.has_metadata());
        assert_eq!((frame.width(), frame.height()), (64, 48));
    }

    #[test]
    fn test_warmup_delays_metadata() {
        let camera = DeviceCameraFake::new(Arc::new(LoggerFake::new()), Duration::from_secs(60));
        camera.start(64, 48).unwrap();

        assert!(camera.is_started());
        assert!(!camera.has_metadata());
        assert!(camera.capture_frame().is_err());
    }

    #[test]
    fn test_stop_releases_capture() {
        let camera = DeviceCameraFake::new(Arc::new(LoggerFake::new()), Duration::ZERO);
        camera.start(64, 48).unwrap();
        camera.stop().unwrap();

        assert!(!camera.is_started());
        assert!(!camera.has_metadata());
    }
}
