use crate::classification_loop::core::{Effect, Event, Poller};
use crate::classification_loop::main::{ClassificationLoop, Tasks};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};

impl ClassificationLoop {
    pub(super) fn run_effects(&self, effects: Vec<Effect>, tasks: &mut Tasks) {
        for effect in effects {
            self.run_effect(effect, tasks);
        }
    }

    /// Fires `to_event` every `period`, first after one full period.
    fn spawn_poller(&self, period: Duration, to_event: fn(bool) -> Event) -> JoinHandle<()> {
        let event_sender = self.event_sender.clone();
        let device_camera = self.device_camera.clone();

        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if event_sender
                    .send(to_event(device_camera.has_metadata()))
                    .is_err()
                {
                    break;
                }
            }
        })
    }

    fn spawn_delayed(&self, delay: Duration, to_event: fn(bool) -> Event) -> JoinHandle<()> {
        let event_sender = self.event_sender.clone();
        let device_camera = self.device_camera.clone();

        tokio::spawn(async move {
            sleep(delay).await;
            let _ = event_sender.send(to_event(device_camera.has_metadata()));
        })
    }

    pub(super) fn run_effect(&self, effect: Effect, tasks: &mut Tasks) {
        if effect != Effect::ClassifyFrame {
            let _ = self.logger.info(&format!("Running effect: {:?}", effect));
        }

        match effect {
            Effect::AcquireCapture => {
                let device_camera = self.device_camera.clone();
                let logger = self.logger.clone();
                let (width, height) = (self.config.capture_width, self.config.capture_height);

                tasks.spawn(tokio::task::spawn_blocking(move || {
                    if let Err(e) = device_camera.start(width, height) {
                        let _ = logger.error(&format!("Camera failed to start: {}", e));
                    }
                }));
            }
            Effect::LoadModel => {
                let image_classifier = self.image_classifier.clone();
                let event_sender = self.event_sender.clone();

                tasks.spawn(tokio::spawn(async move {
                    let loaded = image_classifier.load().await.map_err(|e| e.to_string());
                    let _ = event_sender.send(Event::ModelLoadDone(loaded));
                }));
            }
            Effect::StartPoller(poller) => {
                let handle = match poller {
                    Poller::Watchdog => self
                        .spawn_poller(self.config.watchdog_interval, |video_ready| {
                            Event::WatchdogTick { video_ready }
                        }),
                    Poller::VideoReadiness => self
                        .spawn_poller(self.config.video_poll_interval, |video_ready| {
                            Event::VideoPollTick { video_ready }
                        }),
                };
                tasks.start_poller(poller, handle);
            }
            Effect::CancelPoller(poller) => tasks.cancel_poller(poller),
            Effect::ProbeModel => {
                if self.image_classifier.is_loaded() {
                    let _ = self
                        .logger
                        .info("Model reports loaded without signalling, continuing");
                    let _ = self.event_sender.send(Event::ModelLoadDone(Ok(())));
                } else {
                    let _ = self.logger.info("Model still loading");
                }
            }
            Effect::ScheduleSettleDelay => {
                tasks.spawn(self.spawn_delayed(self.config.settle_delay, |video_ready| {
                    Event::SettleDelayElapsed { video_ready }
                }));
            }
            Effect::ScheduleRetry => {
                tasks.spawn(self.spawn_delayed(self.config.retry_delay, |_| {
                    Event::RetryDelayElapsed
                }));
            }
            Effect::ClassifyFrame => {
                let device_camera = self.device_camera.clone();
                let image_classifier = self.image_classifier.clone();
                let event_sender = self.event_sender.clone();

                tasks.spawn(tokio::spawn(async move {
                    let result = match device_camera.capture_frame() {
                        Ok(frame) => image_classifier
                            .classify(&frame)
                            .await
                            .map_err(|e| e.to_string()),
                        Err(e) => Err(format!("capture failed: {}", e)),
                    };
                    let _ = event_sender.send(Event::ClassifyDone(result));
                }));
            }
        }
    }
}
