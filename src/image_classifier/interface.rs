use async_trait::async_trait;
use image::DynamicImage;

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

#[async_trait]
pub trait ImageClassifier {
    /// Fetch and prepare the model. The returned future resolving is the
    /// load-complete signal; implementations may finish loading without it
    /// ever resolving, which is what `is_loaded` is for.
    async fn load(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    fn is_loaded(&self) -> bool;

    /// Results are not guaranteed to be sorted.
    async fn classify(
        &self,
        frame: &DynamicImage,
    ) -> Result<Vec<Classification>, Box<dyn std::error::Error + Send + Sync>>;
}
