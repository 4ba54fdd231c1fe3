#[cfg(any(feature = "webcam", test))]
pub mod frame_decode;
pub mod impl_fake;
pub mod impl_image_file;
#[cfg(feature = "webcam")]
pub mod impl_webcam;
pub mod interface;
