use crate::image_classifier::interface::{Classification, ImageClassifier};
use crate::library::logger::interface::Logger;
use async_trait::async_trait;
use image::DynamicImage;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const LABELS: [&str; 8] = [
    "person", "cat", "dog", "cup", "phone", "book", "plant", "keyboard",
];

pub type ScriptedOutcome = Result<Vec<Classification>, String>;

pub struct ImageClassifierFake {
    logger: Arc<dyn Logger + Send + Sync>,
    latency: Duration,
    load_delay: Duration,
    silent_load: bool,
    load_error: Option<String>,
    loaded: AtomicBool,
    classify_count: AtomicUsize,
    script: Mutex<VecDeque<ScriptedOutcome>>,
}

impl ImageClassifierFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>, latency: Duration) -> Self {
        Self {
            logger: logger.with_namespace("image_classifier").with_namespace("fake"),
            latency,
            load_delay: Duration::ZERO,
            silent_load: false,
            load_error: None,
            loaded: AtomicBool::new(false),
            classify_count: AtomicUsize::new(0),
            script: Mutex::new(VecDeque::new()),
        }
    }

    fn next_scripted(&self) -> Option<ScriptedOutcome> {
        self.script.lock().ok().and_then(|mut script| script.pop_front())
    }

    fn random_classifications() -> Vec<Classification> {
        let mut rng = rand::rng();
        let mut remaining = 1.0f32;
        LABELS
            .iter()
            .map(|label| {
                let confidence = rng.random_range(0.0..=remaining);
                remaining -= confidence;
                Classification {
                    label: label.to_string(),
                    confidence,
                }
            })
            .collect()
    }
}

#[cfg(test)]
impl ImageClassifierFake {
    pub fn with_load_delay(mut self, load_delay: Duration) -> Self {
        self.load_delay = load_delay;
        self
    }

    /// Finish loading without ever resolving `load`.
    pub fn with_silent_load(mut self) -> Self {
        self.silent_load = true;
        self
    }

    pub fn with_load_error(mut self, message: &str) -> Self {
        self.load_error = Some(message.to_string());
        self
    }

    /// Outcomes returned in order by `classify` before falling back to
    /// random results.
    pub fn with_script(self, outcomes: Vec<ScriptedOutcome>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.extend(outcomes);
        }
        self
    }

    pub fn classify_count(&self) -> usize {
        self.classify_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageClassifier for ImageClassifierFake {
    async fn load(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.logger.info("Loading model...")?;
        tokio::time::sleep(self.load_delay).await;

        if let Some(message) = &self.load_error {
            return Err(message.clone().into());
        }

        self.loaded.store(true, Ordering::SeqCst);
        self.logger.info("Model loaded")?;

        if self.silent_load {
            std::future::pending::<()>().await;
        }

        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    async fn classify(
        &self,
        _frame: &DynamicImage,
    ) -> Result<Vec<Classification>, Box<dyn std::error::Error + Send + Sync>> {
        self.classify_count.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;

        match self.next_scripted() {
            Some(Ok(classifications)) => Ok(classifications),
            Some(Err(message)) => Err(message.into()),
            None => Ok(Self::random_classifications()),
        }
    }
}
