use crate::classification_loop::core::{
    init, transition, ClassificationState, Effect, Event, Model, Poller,
};
use crate::config::Config;
use crate::device_camera::interface::DeviceCamera;
use crate::image_classifier::interface::ImageClassifier;
use crate::library::logger::interface::Logger;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

pub type SharedModel = Arc<Mutex<Model>>;

/// Snapshot of the shared model. A poisoned lock still holds a usable model.
pub fn read_model(model: &SharedModel) -> Model {
    match model.lock() {
        Ok(model) => model.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Outstanding timers and requests. Aborting a handle is how a poller is
/// cancelled.
#[derive(Default)]
pub struct Tasks {
    pollers: HashMap<Poller, JoinHandle<()>>,
    one_shots: Vec<JoinHandle<()>>,
}

impl Tasks {
    pub fn start_poller(&mut self, poller: Poller, handle: JoinHandle<()>) {
        if let Some(previous) = self.pollers.insert(poller, handle) {
            previous.abort();
        }
    }

    pub fn cancel_poller(&mut self, poller: Poller) {
        if let Some(handle) = self.pollers.remove(&poller) {
            handle.abort();
        }
    }

    pub fn spawn(&mut self, handle: JoinHandle<()>) {
        self.one_shots.retain(|handle| !handle.is_finished());
        self.one_shots.push(handle);
    }

    pub fn abort_all(&mut self) {
        for (_, handle) in self.pollers.drain() {
            handle.abort();
        }
        for handle in self.one_shots.drain(..) {
            handle.abort();
        }
    }
}

pub struct ClassificationLoop {
    pub model: SharedModel,
    pub(super) config: Config,
    pub(super) logger: Arc<dyn Logger + Send + Sync>,
    pub(super) device_camera: Arc<dyn DeviceCamera + Send + Sync>,
    pub(super) image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
    pub(super) event_sender: UnboundedSender<Event>,
    event_receiver: UnboundedReceiver<Event>,
}

impl ClassificationLoop {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        device_camera: Arc<dyn DeviceCamera + Send + Sync>,
        image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
    ) -> Self {
        let (event_sender, event_receiver) = unbounded_channel();
        let (initial, _) = init();

        Self {
            model: Arc::new(Mutex::new(initial)),
            config,
            logger: logger.with_namespace("classification_loop"),
            device_camera,
            image_classifier,
            event_sender,
            event_receiver,
        }
    }

    pub fn shared_model(&self) -> SharedModel {
        self.model.clone()
    }

    fn publish(&self, model: &Model) {
        match self.model.lock() {
            Ok(mut shared) => *shared = model.clone(),
            Err(poisoned) => *poisoned.into_inner() = model.clone(),
        }
    }

    fn report(&self, old: &Model, new: &Model) {
        if old.state == new.state {
            return;
        }
        let _ = match &new.state {
            ClassificationState::Error(e) => self.logger.error(&format!("{}", e)),
            state => self.logger.info(&format!("State: {:?}", state)),
        };
    }

    /// Drive the loop until `shutdown` resolves, then cancel every timer and
    /// release the capture.
    pub async fn run<F>(mut self, shutdown: F) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()>,
    {
        let (mut current_model, effects) = init();
        let mut tasks = Tasks::default();

        self.publish(&current_model);
        self.run_effects(effects, &mut tasks);

        tokio::pin!(shutdown);

        loop {
            let event = tokio::select! {
                _ = &mut shutdown => break,
                event = self.event_receiver.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            let _ = self
                .logger
                .info(&format!("event: {}", event.to_display_string()));

            if let Event::ModelLoadDone(Err(message)) = &event {
                let _ = self.logger.error(&format!("Model load failed: {}", message));
            }

            let (new_model, effects) = transition(&self.config, current_model.clone(), event);

            self.report(&current_model, &new_model);
            current_model = new_model;
            self.publish(&current_model);
            self.run_effects(effects, &mut tasks);
        }

        tasks.abort_all();
        self.logger.info("Shutting down, releasing capture")?;
        self.device_camera.stop()?;
        Ok(())
    }
}
