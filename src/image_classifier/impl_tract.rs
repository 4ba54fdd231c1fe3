use crate::image_classifier::interface::{Classification, ImageClassifier};
use crate::image_classifier::models::model_config::ModelConfig;
use crate::image_classifier::tract::image::frame_to_tensor;
use crate::image_classifier::tract::labels::{parse_labels, scores_to_classifications};
use crate::library::logger::interface::Logger;
use async_trait::async_trait;
use image::DynamicImage;
use std::io::Cursor;
use std::sync::{Arc, OnceLock};
use tract_onnx::prelude::*;

struct LoadedModel {
    plan: TypedRunnableModel<TypedModel>,
    labels: Vec<String>,
    input_shape: (u32, u32),
    mean: [f32; 3],
    std: [f32; 3],
}

impl LoadedModel {
    fn run(&self, frame: &DynamicImage) -> Result<Vec<Classification>, Box<dyn std::error::Error + Send + Sync>> {
        let (width, height) = self.input_shape;
        let input = frame_to_tensor(frame, width, height, self.mean, self.std)?;
        let outputs = self.plan.run(tvec!(input.into_tvalue()))?;
        let output = outputs
            .first()
            .ok_or("Model produced no outputs")?
            .to_array_view::<f32>()?;
        let scores: Vec<f32> = output.iter().copied().collect();

        Ok(scores_to_classifications(&scores, &self.labels))
    }
}

/// ONNX classifier fetched over HTTP and executed with tract.
pub struct ImageClassifierTract {
    config: ModelConfig,
    logger: Arc<dyn Logger + Send + Sync>,
    client: reqwest::Client,
    model: OnceLock<Arc<LoadedModel>>,
}

impl ImageClassifierTract {
    pub fn new(config: ModelConfig, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            config,
            logger: logger.with_namespace("image_classifier").with_namespace("tract"),
            client: reqwest::Client::new(),
            model: OnceLock::new(),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        self.logger.info(&format!("Fetching {}", url))?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn fetch_labels(&self) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        match &self.config.labels_url {
            Some(url) => {
                let body = self.fetch(url).await?;
                Ok(parse_labels(&String::from_utf8_lossy(&body)))
            }
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl ImageClassifier for ImageClassifierTract {
    async fn load(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.is_loaded() {
            return Ok(());
        }

        let bytes = self.fetch(&self.config.model_url).await?;
        let labels = self.fetch_labels().await?;
        let input_shape = self.config.input_shape;

        let plan = tokio::task::spawn_blocking(
            move || -> Result<TypedRunnableModel<TypedModel>, Box<dyn std::error::Error + Send + Sync>> {
                let (width, height) = input_shape;
                let plan = tract_onnx::onnx()
                    .model_for_read(&mut Cursor::new(bytes))?
                    .with_input_fact(0, f32::fact([1, 3, height as usize, width as usize]).into())?
                    .into_optimized()?
                    .into_runnable()?;
                Ok(plan)
            },
        )
        .await??;

        self.logger.info(&format!(
            "Model ready ({} labels, input {}x{})",
            labels.len(),
            input_shape.0,
            input_shape.1
        ))?;

        let _ = self.model.set(Arc::new(LoadedModel {
            plan,
            labels,
            input_shape,
            mean: self.config.mean,
            std: self.config.std,
        }));

        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    async fn classify(
        &self,
        frame: &DynamicImage,
    ) -> Result<Vec<Classification>, Box<dyn std::error::Error + Send + Sync>> {
        let model = self.model.get().cloned().ok_or("Model is not loaded")?;
        let frame = frame.clone();

        tokio::task::spawn_blocking(move || model.run(&frame)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_fake::LoggerFake;

    #[tokio::test]
    async fn test_classify_before_load_fails() {
        let classifier =
            ImageClassifierTract::new(ModelConfig::default(), Arc::new(LoggerFake::new()));

        let result = classifier.classify(&DynamicImage::new_rgb8(8, 8)).await;

        assert!(!classifier.is_loaded());
        assert_eq!(result.unwrap_err().to_string(), "Model is not loaded");
    }
}
