#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub model_url: String,
    /// Either a Teachable Machine style `metadata.json` with a `labels`
    /// array or a plain text file with one label per line.
    pub labels_url: Option<String>,
    pub input_shape: (u32, u32),
    /// Per channel RGB normalization applied after scaling to [0, 1].
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_url: "https://github.com/onnx/models/raw/main/validated/vision/classification/mobilenet/model/mobilenetv2-7.onnx".to_string(),
            labels_url: Some(
                "https://raw.githubusercontent.com/pytorch/hub/master/imagenet_classes.txt"
                    .to_string(),
            ),
            input_shape: (224, 224),
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_ships_with_labels() {
        let config = ModelConfig::default();

        assert!(config.labels_url.is_some());
        assert_eq!(config.input_shape, (224, 224));
        assert!(config.std.iter().all(|s| *s > 0.0));
    }
}
