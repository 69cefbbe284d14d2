use std::sync::Arc;

use thiserror::Error;
use tokio::{sync::broadcast, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use validator::Validate;

use crate::device::{HardwareError, ZoneWriter};

mod definition;
pub use definition::*;

pub mod schemes;
pub use schemes::{Scheme, SchemeError};

mod runtime;

#[derive(Debug, Error)]
pub enum EffectError {
    #[error(transparent)]
    Hardware(#[from] HardwareError),
    #[error(transparent)]
    Scheme(#[from] SchemeError),
    #[error("invalid effect parameters: {0}")]
    InvalidParameters(#[from] validator::ValidationErrors),
    #[error("cannot run {steps} steps in {duration} seconds")]
    InvalidTiming { duration: f64, steps: u32 },
    #[error("{0} is applied once, it cannot be started as a loop")]
    NotLooped(&'static str),
    #[error("{0} runs as a loop, it cannot be applied once")]
    Looped(&'static str),
    #[error("effect task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Notification sent when an effect loop ends
#[derive(Debug, Clone, PartialEq)]
pub enum EffectEvent {
    Completed {
        effect: &'static str,
        /// Description of the failure that ended the loop, if any
        error: Option<String>,
    },
}

pub struct EffectRunHandle {
    token: CancellationToken,
    join_handle: Option<JoinHandle<Result<(), EffectError>>>,
    effect: &'static str,
}

impl EffectRunHandle {
    pub fn effect(&self) -> &'static str {
        self.effect
    }

    /// Ask the loop to stop at its next frame boundary
    pub fn abort(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join_handle
            .as_ref()
            .map(JoinHandle::is_finished)
            .unwrap_or(true)
    }

    /// Wait for the loop to end, including its final reset
    ///
    /// Cancel safe: dropping the returned future leaves the handle untouched.
    pub async fn finish(&mut self) -> Result<(), EffectError> {
        if let Some(jh) = self.join_handle.as_mut() {
            let result = jh.await;
            self.join_handle = None;
            result?
        } else {
            Ok(())
        }
    }
}

impl Drop for EffectRunHandle {
    fn drop(&mut self) {
        if self.join_handle.is_some() {
            // This handle has been discarded, stop the loop anyway
            self.token.cancel();
        }
    }
}

/// Check that `effect` can run as a loop, without touching the hardware
pub fn check(effect: &Effect) -> Result<(), EffectError> {
    let cycle = effect
        .cycle()
        .ok_or(EffectError::NotLooped(effect.name()))?;

    cycle.validate()?;
    cycle.frame_interval().ok_or(EffectError::InvalidTiming {
        duration: cycle.duration,
        steps: cycle.steps,
    })?;

    Ok(())
}

/// Apply a one-shot effect
pub async fn apply(effect: &Effect, writer: &ZoneWriter) -> Result<(), EffectError> {
    if effect.is_looped() {
        return Err(EffectError::Looped(effect.name()));
    }

    runtime::write_frame(writer, effect.frame(0.0)).await
}

/// Start a looped effect on its own task
///
/// The loop runs until the returned handle is aborted or dropped, or a write fails. In every
/// case the keyboard is reset before the task ends and a [EffectEvent::Completed] is sent.
pub fn run(
    effect: Effect,
    writer: Arc<ZoneWriter>,
    events: broadcast::Sender<EffectEvent>,
) -> Result<EffectRunHandle, EffectError> {
    check(&effect)?;

    let token = CancellationToken::new();
    let name = effect.name();

    let join_handle = tokio::spawn({
        let token = token.clone();

        async move {
            info!(effect = name, "effect started");

            let result = runtime::run(&effect, &writer, &token).await;

            match &result {
                Ok(()) => info!(effect = name, "effect stopped"),
                Err(error) => error!(effect = name, error = %error, "effect failed"),
            }

            // Nobody listening is fine
            events
                .send(EffectEvent::Completed {
                    effect: name,
                    error: result.as_ref().err().map(ToString::to_string),
                })
                .ok();

            result
        }
    });

    Ok(EffectRunHandle {
        token,
        join_handle: Some(join_handle),
        effect: name,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        device::testing::RecordingDevice,
        models::{Color, LoopConfig, Zone},
    };

    #[tokio::test]
    async fn apply_solid_and_rainbow() {
        let device = RecordingDevice::new();
        let writer = device.writer().await;

        apply(
            &Effect::Solid {
                color: Color::new(1, 2, 3),
            },
            &writer,
        )
        .await
        .unwrap();
        apply(&Effect::RainbowStatic, &writer).await.unwrap();

        assert_eq!(
            device.writes(),
            vec![
                (Zone::Left, "2 1 3".to_owned()),
                (Zone::Center, "2 1 3".to_owned()),
                (Zone::Right, "2 1 3".to_owned()),
                (Zone::Left, "0 255 0".to_owned()),
                (Zone::Center, "255 0 0".to_owned()),
                (Zone::Right, "0 0 255".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn apply_rejects_loops() {
        let device = RecordingDevice::new();
        let writer = device.writer().await;
        let effect = Effect::RainbowWave {
            cycle: LoopConfig::new(5.0, 100),
        };

        assert!(matches!(
            apply(&effect, &writer).await,
            Err(EffectError::Looped("rainbow-wave"))
        ));
        assert!(device.writes().is_empty());
    }

    #[test]
    fn check_rejects_bad_timing() {
        let bad = [
            LoopConfig::new(0.0, 10),
            LoopConfig::new(-2.0, 10),
            LoopConfig::new(1.0, 0),
            LoopConfig::new(f64::NAN, 10),
            LoopConfig::new(f64::INFINITY, 10),
        ];

        for cycle in bad {
            assert!(
                check(&Effect::RainbowWave { cycle }).is_err(),
                "{:?}",
                cycle
            );
        }

        assert!(check(&Effect::RainbowWave {
            cycle: LoopConfig::new(5.0, 100)
        })
        .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn run_notifies_completion() {
        let device = RecordingDevice::new();
        let writer = Arc::new(device.writer().await);
        let (tx, mut rx) = broadcast::channel(4);

        let mut handle = run(
            Effect::color_cycle("ocean", LoopConfig::new(1.0, 10)).unwrap(),
            writer,
            tx,
        )
        .unwrap();
        assert_eq!(handle.effect(), "color-cycle");

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(!handle.is_finished());

        handle.abort();
        handle.finish().await.unwrap();
        assert!(handle.is_finished());

        assert_eq!(
            rx.recv().await.unwrap(),
            EffectEvent::Completed {
                effect: "color-cycle",
                error: None
            }
        );
        assert_eq!(device.resets(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_loop() {
        let device = RecordingDevice::new();
        let writer = Arc::new(device.writer().await);
        let (tx, mut rx) = broadcast::channel(4);

        let handle = run(
            Effect::RainbowWave {
                cycle: LoopConfig::new(1.0, 10),
            },
            writer,
            tx,
        )
        .unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        drop(handle);

        assert!(matches!(
            rx.recv().await,
            Ok(EffectEvent::Completed { error: None, .. })
        ));
        assert_eq!(device.resets(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_reported() {
        let device = RecordingDevice::new();
        let writer = Arc::new(device.writer().await);
        let (tx, mut rx) = broadcast::channel(4);

        let mut handle = run(
            Effect::Breathing {
                color: Color::new(10, 10, 10),
                cycle: LoopConfig::new(1.0, 10),
            },
            writer,
            tx,
        )
        .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        device.set_failing(true);

        assert!(matches!(
            handle.finish().await,
            Err(EffectError::Hardware(HardwareError::WriteFailed { .. }))
        ));
        match rx.recv().await.unwrap() {
            EffectEvent::Completed { effect, error } => {
                assert_eq!(effect, "breathing");
                assert!(error.unwrap().contains("left zone"));
            }
        }
        assert_eq!(device.resets(), 1);
    }
}
