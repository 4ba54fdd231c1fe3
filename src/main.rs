use classification_loop::main::ClassificationLoop;
use classification_loop::refresh::{gui_render_fn, run_refresh};
use classification_loop::render::Render;
use config::{CameraKind, ClassifierKind, Config, DisplayKind};
use device_camera::impl_fake::DeviceCameraFake;
use device_camera::impl_image_file::DeviceCameraImageFile;
#[cfg(feature = "webcam")]
use device_camera::impl_webcam::DeviceCameraWebcam;
use device_camera::interface::DeviceCamera;
use image_classifier::impl_fake::ImageClassifierFake;
use image_classifier::impl_tract::ImageClassifierTract;
use image_classifier::interface::ImageClassifier;
use library::logger::impl_console::LoggerConsole;
use library::logger::interface::Logger;
use render_surface::impl_console::RenderSurfaceConsole;
use render_surface::impl_gui::run_window;
use std::sync::Arc;

mod classification_loop;
mod config;
mod device_camera;
mod image_classifier;
mod library;
mod render_surface;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), BoxError> {
    let config = Config::default();

    let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerConsole::new(config.logger_timezone));

    let device_camera: Arc<dyn DeviceCamera + Send + Sync> = match config.camera {
        CameraKind::Fake => Arc::new(DeviceCameraFake::new(logger.clone(), config.camera_warmup)),
        CameraKind::ImageFile => Arc::new(DeviceCameraImageFile::new(
            &config.image_file_path,
            logger.clone(),
        )),
        #[cfg(feature = "webcam")]
        CameraKind::Webcam => Arc::new(DeviceCameraWebcam::new(
            config.webcam_device_index,
            logger.clone(),
        )),
        #[cfg(not(feature = "webcam"))]
        CameraKind::Webcam => return Err("Built without the webcam feature".into()),
    };

    let image_classifier: Arc<dyn ImageClassifier + Send + Sync> = match config.classifier {
        ClassifierKind::Fake => Arc::new(ImageClassifierFake::new(
            logger.clone(),
            config.fake_classify_latency,
        )),
        ClassifierKind::Tract => Arc::new(ImageClassifierTract::new(
            config.model.clone(),
            logger.clone(),
        )),
    };

    let classification_loop = ClassificationLoop::new(
        config.clone(),
        logger.clone(),
        device_camera.clone(),
        image_classifier,
    );
    let model = classification_loop.shared_model();
    let render = Render::new(config.clone(), device_camera);

    let width = config.capture_width as f32;
    let height = config.capture_height as f32;

    match config.display {
        DisplayKind::Console => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;

            runtime.block_on(async {
                let surface = RenderSurfaceConsole::new(width, height, logger.clone());
                let refresh = tokio::spawn(run_refresh(
                    render,
                    model,
                    surface,
                    config.refresh_interval,
                    logger.clone(),
                ));

                let result = classification_loop
                    .run(async {
                        let _ = tokio::signal::ctrl_c().await;
                    })
                    .await;

                refresh.abort();
                result
            })
        }
        DisplayKind::Gui => {
            let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

            let loop_thread = std::thread::spawn(move || -> Result<(), BoxError> {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()?;
                runtime.block_on(classification_loop.run(async {
                    let _ = shutdown_rx.await;
                }))
            });

            let window = run_window(
                "Webcam Classifier",
                width,
                height,
                config.refresh_interval,
                logger.clone(),
                gui_render_fn(render, model),
            );

            let _ = shutdown_tx.send(());
            let stopped = loop_thread
                .join()
                .map_err(|_| "Classification loop panicked")?;

            window?;
            stopped
        }
    }
}
