use image::{imageops, DynamicImage, RgbImage};
use tract_onnx::prelude::*;

/// Fit `image` inside `width`x`height` keeping its aspect ratio, padding the
/// rest with black.
pub fn letterbox(image: &DynamicImage, width: u32, height: u32) -> RgbImage {
    if image.width() == width && image.height() == height {
        return image.to_rgb8();
    }

    let (w, h) = (image.width() as f32, image.height() as f32);
    let scale = (width as f32 / w).min(height as f32 / h);
    let new_w = ((w * scale) as u32).clamp(1, width);
    let new_h = ((h * scale) as u32).clamp(1, height);

    let scaled = image
        .resize_exact(new_w, new_h, imageops::FilterType::Triangle)
        .to_rgb8();

    let mut padded = RgbImage::new(width, height);
    let x_offset = (width - new_w) / 2;
    let y_offset = (height - new_h) / 2;
    imageops::overlay(&mut padded, &scaled, x_offset as i64, y_offset as i64);
    padded
}

/// NCHW float tensor. Channels are scaled to [0, 1], then shifted by `mean`
/// and divided by `std`.
pub fn frame_to_tensor(
    frame: &DynamicImage,
    width: u32,
    height: u32,
    mean: [f32; 3],
    std: [f32; 3],
) -> Result<Tensor, Box<dyn std::error::Error + Send + Sync>> {
    if std.iter().any(|s| *s == 0.0) {
        return Err("Normalization std must be non-zero".into());
    }
    let rgb = letterbox(frame, width, height);

    let tensor = tract_ndarray::Array4::from_shape_fn(
        (1, 3, height as usize, width as usize),
        |(_, c, y, x)| {
            let value = rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
            (value - mean[c]) / std[c]
        },
    );

    Ok(tensor.into_tensor())
}
