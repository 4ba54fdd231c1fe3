use crate::device_camera::frame_decode::{decode_frame, PixelFormat};
use crate::device_camera::interface::DeviceCamera;
use crate::library::logger::interface::Logger;
use image::{imageops, DynamicImage};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

const BUFFER_COUNT: u32 = 4;
const FRAME_TIMEOUT: Duration = Duration::from_secs(1);

type LatestFrame = Arc<Mutex<Option<DynamicImage>>>;

fn store(latest: &LatestFrame, frame: Option<DynamicImage>) {
    match latest.lock() {
        Ok(mut current) => *current = frame,
        Err(poisoned) => *poisoned.into_inner() = frame,
    }
}

/// V4L2 webcam. A capture thread keeps the most recent decoded frame; the
/// camera has metadata once the first frame decodes.
pub struct DeviceCameraWebcam {
    device_index: usize,
    logger: Arc<dyn Logger + Send + Sync>,
    latest: LatestFrame,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DeviceCameraWebcam {
    pub fn new(device_index: usize, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            device_index,
            logger: logger.with_namespace("camera").with_namespace("webcam"),
            latest: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    fn take_worker(&self) -> Option<JoinHandle<()>> {
        match self.worker.lock() {
            Ok(mut worker) => worker.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    fn set_worker(&self, handle: JoinHandle<()>) {
        match self.worker.lock() {
            Ok(mut worker) => *worker = Some(handle),
            Err(poisoned) => *poisoned.into_inner() = Some(handle),
        }
    }
}

struct CaptureSession {
    device_index: usize,
    width: u32,
    height: u32,
    running: Arc<AtomicBool>,
    latest: LatestFrame,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl CaptureSession {
    fn run(self) {
        if let Err(e) = self.stream() {
            let _ = self.logger.error(&format!("Capture stopped: {}", e));
        }
        self.running.store(false, Ordering::SeqCst);
    }

    fn stream(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let device = Device::new(self.device_index)?;

        let mut requested = device.format()?;
        requested.width = self.width;
        requested.height = self.height;
        requested.fourcc = FourCC::new(&PixelFormat::PREFERRED);
        let format = device.set_format(&requested)?;

        let pixel_format = PixelFormat::from_fourcc(format.fourcc.repr)
            .ok_or_else(|| format!("Unsupported pixel format {}", format.fourcc))?;

        self.logger.info(&format!(
            "Streaming /dev/video{} at {}x{} {}",
            self.device_index, format.width, format.height, format.fourcc
        ))?;

        let mut stream = Stream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)?;
        stream.set_timeout(FRAME_TIMEOUT);

        while self.running.load(Ordering::SeqCst) {
            let (buffer, meta) = match stream.next() {
                Ok(next) => next,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
                Err(e) => return Err(e.into()),
            };
            let used = (meta.bytesused as usize).min(buffer.len());

            match decode_frame(pixel_format, &buffer[..used], format.width, format.height) {
                Ok(frame) => store(&self.latest, Some(self.fit(frame))),
                // Webcams emit the odd truncated frame, the next one replaces it.
                Err(e) => {
                    let _ = self.logger.error(&format!("Dropped frame: {}", e));
                }
            }
        }

        Ok(())
    }

    fn fit(&self, frame: DynamicImage) -> DynamicImage {
        if frame.width() == self.width && frame.height() == self.height {
            frame
        } else {
            frame.resize_exact(self.width, self.height, imageops::FilterType::Triangle)
        }
    }
}

impl DeviceCamera for DeviceCameraWebcam {
    fn start(&self, width: u32, height: u32) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.stop()?;
        self.logger.info(&format!(
            "Opening /dev/video{} at {}x{}...",
            self.device_index, width, height
        ))?;

        self.running.store(true, Ordering::SeqCst);
        let session = CaptureSession {
            device_index: self.device_index,
            width,
            height,
            running: self.running.clone(),
            latest: self.latest.clone(),
            logger: self.logger.clone(),
        };

        let handle = std::thread::Builder::new()
            .name("webcam-capture".to_string())
            .spawn(move || session.run())?;
        self.set_worker(handle);
        Ok(())
    }

    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.take_worker() {
            self.logger.info("Stopping capture...")?;
            handle.join().map_err(|_| "Capture thread panicked")?;
        }
        store(&self.latest, None);
        Ok(())
    }

    fn has_metadata(&self) -> bool {
        match self.latest.lock() {
            Ok(latest) => latest.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    fn capture_frame(&self) -> Result<DynamicImage, Box<dyn std::error::Error + Send + Sync>> {
        let latest = match self.latest.lock() {
            Ok(latest) => latest.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        latest.ok_or_else(|| "No frame decoded yet".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_fake::LoggerFake;

    #[test]
    fn test_no_frame_before_start() {
        let camera = DeviceCameraWebcam::new(0, Arc::new(LoggerFake::new()));

        assert!(!camera.has_metadata());
        assert!(camera.capture_frame().is_err());
        assert!(camera.stop().is_ok());
    }

    #[test]
    fn test_missing_device_never_becomes_ready() {
        let logger = LoggerFake::new();
        let camera = DeviceCameraWebcam::new(250, Arc::new(logger.clone()));

        camera.start(64, 48).unwrap();
        std::thread::sleep(Duration::from_millis(200));

        assert!(!camera.has_metadata());
        assert!(logger
            .lines()
            .iter()
            .any(|line| line.starts_with("ERROR") && line.contains("Capture stopped")));
        camera.stop().unwrap();
    }

    #[test]
    fn test_stop_clears_last_frame() {
        let camera = DeviceCameraWebcam::new(0, Arc::new(LoggerFake::new()));
        store(&camera.latest, Some(DynamicImage::new_rgb8(4, 4)));
        assert!(camera.has_metadata());

        camera.stop().unwrap();

        assert!(!camera.has_metadata());
    }
}
