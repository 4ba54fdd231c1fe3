use crate::image_classifier::models::model_config::ModelConfig;
use chrono::Offset;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraKind {
    Fake,
    ImageFile,
    Webcam,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassifierKind {
    Fake,
    Tract,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayKind {
    Gui,
    Console,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub capture_width: u32,
    pub capture_height: u32,
    pub camera: CameraKind,
    pub camera_warmup: Duration,
    pub webcam_device_index: usize,
    pub image_file_path: String,
    pub classifier: ClassifierKind,
    pub model: ModelConfig,
    pub fake_classify_latency: Duration,
    pub display: DisplayKind,
    pub refresh_interval: Duration,
    pub caption_bar_height: f32,
    pub watchdog_interval: Duration,
    pub watchdog_probe_attempt: u32,
    pub watchdog_max_attempts: u32,
    pub settle_delay: Duration,
    pub video_poll_interval: Duration,
    pub retry_delay: Duration,
    pub logger_timezone: chrono::FixedOffset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capture_width: 640,
            capture_height: 480,
            camera: default_camera(),
            camera_warmup: Duration::from_millis(1500),
            webcam_device_index: 0,
            image_file_path: "./assets/frame.jpeg".to_string(),
            classifier: ClassifierKind::Tract,
            model: ModelConfig::default(),
            fake_classify_latency: Duration::from_millis(200),
            display: DisplayKind::Gui,
            refresh_interval: Duration::from_millis(16),
            caption_bar_height: 50.0,
            watchdog_interval: Duration::from_secs(1),
            watchdog_probe_attempt: 5,
            watchdog_max_attempts: 10,
            settle_delay: Duration::from_millis(500),
            video_poll_interval: Duration::from_millis(100),
            retry_delay: Duration::from_secs(1),
            logger_timezone: utc(),
        }
    }
}

fn utc() -> chrono::FixedOffset {
    chrono::Utc.fix()
}

fn default_camera() -> CameraKind {
    if cfg!(feature = "webcam") {
        CameraKind::Webcam
    } else {
        CameraKind::Fake
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_runs_the_real_model() {
        let config = Config::default();

        assert_eq!(config.classifier, ClassifierKind::Tract);
        assert!(config.model.labels_url.is_some());
    }

    #[test]
    #[cfg(feature = "webcam")]
    fn test_default_captures_from_webcam() {
        let config = Config::default();

        assert_eq!(config.camera, CameraKind::Webcam);
        assert_eq!(config.webcam_device_index, 0);
    }
}
