use crate::config::Config;
use crate::image_classifier::interface::Classification;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoopError {
    #[error("timeout loading model")]
    ModelLoadTimeout,

    #[error("classification failed: {0}")]
    ClassificationFailure(String),
}

impl LoopError {
    /// Terminal errors need a restart; everything else is retried.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopError::ModelLoadTimeout)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationState {
    Loading,
    WaitingForVideo,
    Ready,
    Classifying,
    Error(LoopError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

impl Prediction {
    pub fn caption(&self) -> String {
        format!("{}: {:.1}%", self.label, self.confidence * 100.0)
    }
}

/// Highest-confidence entry. The classifier does not promise any ordering.
pub fn top_prediction(classifications: &[Classification]) -> Option<Prediction> {
    classifications
        .iter()
        .filter(|c| !c.confidence.is_nan())
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
        .map(|c| Prediction {
            label: c.label.clone(),
            confidence: c.confidence.clamp(0.0, 1.0),
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub state: ClassificationState,
    pub prediction: Option<Prediction>,
    pub model_ready: bool,
    pub watchdog_attempts: u32,
    pub cycle_started: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Poller {
    Watchdog,
    VideoReadiness,
}

#[derive(Debug)]
pub enum Event {
    WatchdogTick { video_ready: bool },
    ModelLoadDone(Result<(), String>),
    SettleDelayElapsed { video_ready: bool },
    VideoPollTick { video_ready: bool },
    ClassifyDone(Result<Vec<Classification>, String>),
    RetryDelayElapsed,
}

impl Event {
    pub fn to_display_string(&self) -> String {
        match self {
            Event::ClassifyDone(Ok(classifications)) => match top_prediction(classifications) {
                Some(top) => format!(
                    "ClassifyDone(Ok({} results, top {}))",
                    classifications.len(),
                    top.caption()
                ),
                None => "ClassifyDone(Ok(no results))".to_string(),
            },
            event => format!("{:?}", event),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AcquireCapture,
    LoadModel,
    StartPoller(Poller),
    CancelPoller(Poller),
    ProbeModel,
    ScheduleSettleDelay,
    ClassifyFrame,
    ScheduleRetry,
}

pub fn init() -> (Model, Vec<Effect>) {
    (
        Model {
            state: ClassificationState::Loading,
            prediction: None,
            model_ready: false,
            watchdog_attempts: 0,
            cycle_started: false,
        },
        vec![
            Effect::AcquireCapture,
            Effect::LoadModel,
            Effect::StartPoller(Poller::Watchdog),
        ],
    )
}

fn is_timed_out(model: &Model) -> bool {
    matches!(&model.state, ClassificationState::Error(e) if e.is_terminal())
}

/// Enter `Ready` for the first and only time, then submit the first frame.
fn begin_cycle(mut model: Model, mut effects: Vec<Effect>) -> (Model, Vec<Effect>) {
    if model.cycle_started {
        return (model, effects);
    }
    model.cycle_started = true;
    model.state = ClassificationState::Ready;
    let (model, cycle_effects) = classify_cycle(model);
    effects.extend(cycle_effects);
    (model, effects)
}

fn classify_cycle(mut model: Model) -> (Model, Vec<Effect>) {
    if !model.model_ready || !model.cycle_started {
        return (model, vec![]);
    }
    match model.state {
        ClassificationState::Ready => {
            model.state = ClassificationState::Classifying;
            (model, vec![Effect::ClassifyFrame])
        }
        _ => (model, vec![]),
    }
}

fn on_model_load_complete(mut model: Model) -> (Model, Vec<Effect>) {
    if model.model_ready || is_timed_out(&model) {
        return (model, vec![]);
    }
    model.model_ready = true;
    model.state = ClassificationState::WaitingForVideo;
    (
        model,
        vec![
            Effect::CancelPoller(Poller::Watchdog),
            Effect::ScheduleSettleDelay,
        ],
    )
}

fn poll_readiness(config: &Config, mut model: Model, video_ready: bool) -> (Model, Vec<Effect>) {
    if model.model_ready || is_timed_out(&model) {
        return (model, vec![Effect::CancelPoller(Poller::Watchdog)]);
    }

    model.watchdog_attempts += 1;
    let mut effects = vec![];

    // Best effort: the load signal may never arrive even though the model is usable.
    if model.watchdog_attempts == config.watchdog_probe_attempt && video_ready {
        effects.push(Effect::ProbeModel);
    }

    if model.watchdog_attempts >= config.watchdog_max_attempts {
        model.state = ClassificationState::Error(LoopError::ModelLoadTimeout);
        effects.push(Effect::CancelPoller(Poller::Watchdog));
    }

    (model, effects)
}

pub fn transition(config: &Config, model: Model, event: Event) -> (Model, Vec<Effect>) {
    match event {
        Event::WatchdogTick { video_ready } => poll_readiness(config, model, video_ready),

        Event::ModelLoadDone(Ok(())) => on_model_load_complete(model),
        Event::ModelLoadDone(Err(_)) => (model, vec![]),

        Event::SettleDelayElapsed { video_ready } => {
            if model.state != ClassificationState::WaitingForVideo {
                return (model, vec![]);
            }
            if video_ready {
                begin_cycle(model, vec![])
            } else {
                (model, vec![Effect::StartPoller(Poller::VideoReadiness)])
            }
        }

        Event::VideoPollTick { video_ready } => {
            if model.state != ClassificationState::WaitingForVideo {
                return (model, vec![Effect::CancelPoller(Poller::VideoReadiness)]);
            }
            if video_ready {
                begin_cycle(model, vec![Effect::CancelPoller(Poller::VideoReadiness)])
            } else {
                (model, vec![])
            }
        }

        Event::ClassifyDone(result) => {
            if model.state != ClassificationState::Classifying {
                return (model, vec![]);
            }
            match result {
                Ok(classifications) => {
                    let mut model = model;
                    if let Some(prediction) = top_prediction(&classifications) {
                        model.prediction = Some(prediction);
                    }
                    model.state = ClassificationState::Ready;
                    classify_cycle(model)
                }
                Err(message) => {
                    let mut model = model;
                    model.state =
                        ClassificationState::Error(LoopError::ClassificationFailure(message));
                    (model, vec![Effect::ScheduleRetry])
                }
            }
        }

        Event::RetryDelayElapsed => match &model.state {
            ClassificationState::Error(e) if !e.is_terminal() => {
                let mut model = model;
                model.state = ClassificationState::Ready;
                classify_cycle(model)
            }
            _ => (model, vec![]),
        },
    }
}
