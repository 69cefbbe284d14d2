use std::sync::Arc;

use tokio::sync::broadcast;

use crate::{
    device::ZoneWriter,
    effects::{self, schemes, Effect, EffectError, EffectEvent, EffectRunHandle},
};

/// Owns the keyboard and the single effect loop allowed to drive it
pub struct EffectRunner {
    writer: Arc<ZoneWriter>,
    current: Option<EffectRunHandle>,
    events: broadcast::Sender<EffectEvent>,
}

impl EffectRunner {
    pub fn new(writer: ZoneWriter) -> Self {
        let (events, _) = broadcast::channel(16);

        Self {
            writer: Arc::new(writer),
            current: None,
            events,
        }
    }

    pub fn writer(&self) -> &ZoneWriter {
        &self.writer
    }

    /// Receive a notification every time an effect loop ends
    pub fn subscribe(&self) -> broadcast::Receiver<EffectEvent> {
        self.events.subscribe()
    }

    /// Names of the color schemes usable with [Effect::ColorCycle]
    pub fn list_schemes() -> Vec<&'static str> {
        schemes::names()
    }

    /// Name of the running effect, if any
    pub fn running(&self) -> Option<&'static str> {
        self.current
            .as_ref()
            .filter(|handle| !handle.is_finished())
            .map(EffectRunHandle::effect)
    }

    /// Stop the running effect, waiting for its reset to complete
    ///
    /// Returns the outcome of the stopped loop.
    pub async fn stop(&mut self) -> Result<(), EffectError> {
        if let Some(mut handle) = self.current.take() {
            handle.abort();
            let result = handle.finish().await;
            debug!(effect = handle.effect(), "effect joined");
            result
        } else {
            Ok(())
        }
    }

    /// Wait for the running effect to end on its own, which only happens on failure
    ///
    /// Cancel safe. Returns immediately if no effect is running.
    pub async fn wait(&mut self) -> Result<(), EffectError> {
        match self.current.as_mut() {
            Some(handle) => {
                let result = handle.finish().await;
                self.current = None;
                result
            }
            None => Ok(()),
        }
    }

    async fn stop_previous(&mut self) {
        if let Err(error) = self.stop().await {
            // Already reported through the completion event
            warn!(error = %error, "previous effect ended with an error");
        }
    }

    /// Start a looped effect, stopping the previous one first
    ///
    /// Invalid effects are rejected before the previous effect is touched.
    pub async fn start(&mut self, effect: Effect) -> Result<(), EffectError> {
        effects::check(&effect)?;

        self.stop_previous().await;
        self.current = Some(effects::run(
            effect,
            self.writer.clone(),
            self.events.clone(),
        )?);

        Ok(())
    }

    /// Apply a one-shot effect, stopping the running effect first
    pub async fn apply(&mut self, effect: Effect) -> Result<(), EffectError> {
        if effect.is_looped() {
            return Err(EffectError::Looped(effect.name()));
        }

        self.stop_previous().await;
        info!(effect = effect.name(), "applying effect");
        effects::apply(&effect, &self.writer).await
    }

    /// Stop the running effect and bring the keyboard back to white
    pub async fn reset(&mut self) -> Result<(), EffectError> {
        self.stop_previous().await;
        Ok(self.writer.reset().await?)
    }
}

impl std::fmt::Debug for EffectRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRunner")
            .field("writer", &self.writer)
            .field("running", &self.running())
            .finish()
    }
}
