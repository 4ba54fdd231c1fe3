use image::DynamicImage;

pub trait DeviceCamera {
    /// Acquire the capture at the requested resolution. Readiness is reported
    /// separately through `has_metadata` and may lag behind this call.
    fn start(&self, width: u32, height: u32) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn has_metadata(&self) -> bool;
    fn capture_frame(&self) -> Result<DynamicImage, Box<dyn std::error::Error + Send + Sync>>;
}
