use image::{DynamicImage, ImageFormat, RgbImage};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PixelFormat {
    Mjpeg,
    Yuyv,
}

impl PixelFormat {
    pub const PREFERRED: [u8; 4] = *b"MJPG";

    pub fn from_fourcc(fourcc: [u8; 4]) -> Option<Self> {
        match &fourcc {
            b"MJPG" => Some(PixelFormat::Mjpeg),
            b"YUYV" => Some(PixelFormat::Yuyv),
            _ => None,
        }
    }
}

fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// BT.601 studio swing YCbCr to RGB.
fn ycbcr_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = y as i32 - 16;
    let d = u as i32 - 128;
    let e = v as i32 - 128;

    [
        clamp_channel((298 * c + 409 * e + 128) >> 8),
        clamp_channel((298 * c - 100 * d - 208 * e + 128) >> 8),
        clamp_channel((298 * c + 516 * d + 128) >> 8),
    ]
}

/// Packed `Y0 U Y1 V`, two pixels per four bytes.
fn yuyv_to_rgb(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> Result<RgbImage, Box<dyn std::error::Error + Send + Sync>> {
    let expected = width as usize * height as usize * 2;
    if width % 2 != 0 || bytes.len() < expected {
        return Err(format!(
            "YUYV frame is {} bytes, expected {} for {}x{}",
            bytes.len(),
            expected,
            width,
            height
        )
        .into());
    }

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for chunk in bytes[..expected].chunks_exact(4) {
        let (y0, u, y1, v) = (chunk[0], chunk[1], chunk[2], chunk[3]);
        rgb.extend_from_slice(&ycbcr_to_rgb(y0, u, v));
        rgb.extend_from_slice(&ycbcr_to_rgb(y1, u, v));
    }

    RgbImage::from_raw(width, height, rgb).ok_or_else(|| "YUYV buffer size mismatch".into())
}

pub fn decode_frame(
    format: PixelFormat,
    bytes: &[u8],
    width: u32,
    height: u32,
) -> Result<DynamicImage, Box<dyn std::error::Error + Send + Sync>> {
    match format {
        PixelFormat::Mjpeg => Ok(image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?),
        PixelFormat::Yuyv => Ok(DynamicImage::ImageRgb8(yuyv_to_rgb(bytes, width, height)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use image::Rgb;

    #[test]
    fn test_known_fourccs() {
        assert_eq!(PixelFormat::from_fourcc(*b"MJPG"), Some(PixelFormat::Mjpeg));
        assert_eq!(PixelFormat::from_fourcc(*b"YUYV"), Some(PixelFormat::Yuyv));
        assert_eq!(PixelFormat::from_fourcc(*b"NV12"), None);
    }

    #[test]
    fn test_yuyv_black_and_white() {
        // Two black pixels then two white pixels, neutral chroma.
        let bytes = [16, 128, 16, 128, 235, 128, 235, 128];

        let frame = decode_frame(PixelFormat::Yuyv, &bytes, 2, 2).unwrap().to_rgb8();

        assert_eq!(frame.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(frame.get_pixel(1, 0), &Rgb([0, 0, 0]));
        assert_eq!(frame.get_pixel(0, 1), &Rgb([255, 255, 255]));
        assert_eq!(frame.get_pixel(1, 1), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_yuyv_red_chroma_is_mostly_red() {
        let bytes = [81, 90, 81, 240];

        let frame = decode_frame(PixelFormat::Yuyv, &bytes, 2, 1).unwrap().to_rgb8();
        let pixel = frame.get_pixel(0, 0);

        assert!(pixel[0] > 240);
        assert!(pixel[1] < 10);
        assert!(pixel[2] < 10);
    }

    #[test]
    fn test_short_yuyv_buffer_is_rejected() {
        assert!(decode_frame(PixelFormat::Yuyv, &[0; 6], 2, 2).is_err());
    }

    #[test]
    fn test_mjpeg_frame_decodes() {
        let source = RgbImage::from_pixel(16, 8, Rgb([200, 30, 30]));
        let mut jpeg = Vec::new();
        JpegEncoder::new(&mut jpeg).encode_image(&source).unwrap();

        let frame = decode_frame(PixelFormat::Mjpeg, &jpeg, 16, 8).unwrap();

        assert_eq!((frame.width(), frame.height()), (16, 8));
    }

    #[test]
    fn test_corrupt_mjpeg_is_an_error() {
        assert!(decode_frame(PixelFormat::Mjpeg, &[0xff, 0xd8, 0x00], 16, 8).is_err());
    }
}
