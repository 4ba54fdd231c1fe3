use crate::classification_loop::main::{read_model, SharedModel};
use crate::classification_loop::render::Render;
use crate::library::logger::interface::Logger;
use crate::render_surface::impl_gui::RenderFn;
use crate::render_surface::interface::RenderSurface;
use std::sync::Arc;
use std::time::Duration;

/// Render callback for the window driver. Reads a model snapshot per tick.
pub fn gui_render_fn(render: Render, model: SharedModel) -> RenderFn {
    Box::new(move |surface: &mut dyn RenderSurface| render.render(surface, &read_model(&model)))
}

/// Fixed-cadence refresh driver for surfaces that have no event loop of their
/// own. Render errors are logged and the next tick proceeds.
pub async fn run_refresh<S>(
    render: Render,
    model: SharedModel,
    mut surface: S,
    refresh_interval: Duration,
    logger: Arc<dyn Logger + Send + Sync>,
) where
    S: RenderSurface,
{
    let logger = logger.with_namespace("refresh");
    let mut interval = tokio::time::interval(refresh_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        if let Err(e) = render.render(&mut surface, &read_model(&model)) {
            let _ = logger.error(&format!("Render failed: {}", e));
        }
    }
}
