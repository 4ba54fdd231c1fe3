use crate::classification_loop::core::Model;
use crate::classification_loop::main::{read_model, ClassificationLoop, SharedModel};
use crate::config::{CameraKind, ClassifierKind, Config, DisplayKind};
use crate::device_camera::impl_fake::DeviceCameraFake;
use crate::image_classifier::impl_fake::{ImageClassifierFake, ScriptedOutcome};
use crate::image_classifier::interface::Classification;
use crate::library::logger::impl_fake::LoggerFake;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub fn test_config() -> Config {
    Config {
        camera: CameraKind::Fake,
        classifier: ClassifierKind::Fake,
        display: DisplayKind::Console,
        capture_width: 64,
        capture_height: 48,
        ..Config::default()
    }
}

pub fn classification(label: &str, confidence: f32) -> Classification {
    Classification {
        label: label.to_string(),
        confidence,
    }
}

pub fn cat_and_dog() -> Vec<Classification> {
    vec![classification("cat", 0.92), classification("dog", 0.05)]
}

pub fn repeat_ok(classifications: Vec<Classification>, times: usize) -> Vec<ScriptedOutcome> {
    (0..times).map(|_| Ok(classifications.clone())).collect()
}

pub struct Fixture {
    pub logger: LoggerFake,
    pub device_camera: Arc<DeviceCameraFake>,
    pub image_classifier: Arc<ImageClassifierFake>,
    pub model: SharedModel,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<Result<(), Box<dyn std::error::Error + Send + Sync>>>>,
}

impl Fixture {
    pub fn new(camera_warmup: Duration, image_classifier: ImageClassifierFake) -> Self {
        let config = test_config();
        let logger = LoggerFake::new();
        let device_camera = Arc::new(DeviceCameraFake::new(Arc::new(logger.clone()), camera_warmup));
        let image_classifier = Arc::new(image_classifier);
        let classification_loop = ClassificationLoop::new(
            config,
            Arc::new(logger.clone()),
            device_camera.clone(),
            image_classifier.clone(),
        );
        let model = classification_loop.shared_model();

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(classification_loop.run(async move {
            let _ = shutdown_rx.await;
        }));

        Self {
            logger,
            device_camera,
            image_classifier,
            model,
            shutdown: Some(shutdown),
            handle: Some(handle),
        }
    }

    pub fn classifier(latency: Duration, load_delay: Duration) -> ImageClassifierFake {
        ImageClassifierFake::new(Arc::new(LoggerFake::new()), latency).with_load_delay(load_delay)
    }

    pub fn model(&self) -> Model {
        read_model(&self.model)
    }

    pub fn error_lines(&self) -> Vec<String> {
        self.logger
            .lines()
            .into_iter()
            .filter(|line| line.starts_with("ERROR"))
            .collect()
    }

    pub fn count_lines_containing(&self, text: &str) -> usize {
        self.logger
            .lines()
            .iter()
            .filter(|line| line.contains(text))
            .count()
    }

    pub async fn shutdown(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.unwrap().unwrap();
        }
    }
}
