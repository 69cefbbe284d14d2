use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::device::ZoneWriter;

use super::{Effect, EffectError, Frame};

pub(super) async fn write_frame(writer: &ZoneWriter, frame: Frame) -> Result<(), EffectError> {
    match frame {
        Frame::All(color) => writer.set_all(color).await?,
        Frame::Zones(colors) => writer.set_zones(colors).await?,
    }

    Ok(())
}

/// Run the frames of `effect` until `token` is cancelled or a write fails
///
/// Frames are scheduled against absolute deadlines, so the time spent writing does not
/// accumulate as drift. Cancellation is only observed between frames.
async fn run_frames(
    effect: &Effect,
    writer: &ZoneWriter,
    token: &CancellationToken,
) -> Result<(), EffectError> {
    let cycle = effect
        .cycle()
        .ok_or(EffectError::NotLooped(effect.name()))?;
    let period = cycle.frame_interval().ok_or(EffectError::InvalidTiming {
        duration: cycle.duration,
        steps: cycle.steps,
    })?;

    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        for i in 0..cycle.steps {
            tokio::select! {
                biased;

                _ = token.cancelled() => {
                    return Ok(());
                }
                _ = interval.tick() => {}
            }

            write_frame(writer, effect.step(i, cycle.steps)).await?;
        }

        trace!(effect = effect.name(), "cycle completed");
    }
}

/// Run `effect` on `writer`, then reset the keyboard exactly once, however the loop ended
///
/// An error from the loop takes precedence over an error from the reset.
pub(super) async fn run(
    effect: &Effect,
    writer: &ZoneWriter,
    token: &CancellationToken,
) -> Result<(), EffectError> {
    let result = run_frames(effect, writer, token).await;
    let reset = writer.reset().await;

    match (result, reset) {
        (Err(error), Err(reset_error)) => {
            warn!(error = %reset_error, "failed to reset keyboard after effect failure");
            Err(error)
        }
        (Err(error), Ok(())) => Err(error),
        (Ok(()), reset) => Ok(reset?),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        device::{testing::RecordingDevice, HardwareError},
        models::{Color, LoopConfig, Zone},
    };

    fn breathing() -> Effect {
        Effect::Breathing {
            color: Color::new(200, 100, 50),
            cycle: LoopConfig::new(1.0, 10),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_resets_once() {
        let device = RecordingDevice::new();
        let writer = device.writer().await;
        let token = CancellationToken::new();

        let effect = breathing();
        let (result, _) = tokio::join!(run(&effect, &writer, &token), async {
            time::sleep(Duration::from_millis(250)).await;
            token.cancel();
        });

        result.expect("effect failed");

        let writes = device.writes();
        // 3 frames (0, 100 and 200ms), then the reset
        assert_eq!(writes.len(), 3 * 3 + 3);
        assert_eq!(writes[0], (Zone::Left, "50 100 25".to_owned()));
        for (zone, (written, payload)) in Zone::ALL.iter().zip(&writes[9..]) {
            assert_eq!(written, zone);
            assert_eq!(payload, "255 255 255");
        }
        assert_eq!(device.resets(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn frames_cover_the_cycle() {
        let device = RecordingDevice::new();
        let writer = device.writer().await;
        let token = CancellationToken::new();
        let effect = Effect::RainbowWave {
            cycle: LoopConfig::new(1.0, 4),
        };

        // One full cycle plus the first frame of the next one
        let (result, _) = tokio::join!(run(&effect, &writer, &token), async {
            time::sleep(Duration::from_millis(1100)).await;
            token.cancel();
        });
        result.unwrap();

        let writes = device.writes();
        let left: Vec<_> = writes
            .iter()
            .filter(|(zone, _)| *zone == Zone::Left)
            .map(|(_, payload)| payload.as_str())
            .collect();

        // Hues 0, 1/4, 1/2, 3/4, 0 in GRB order, then the reset
        assert_eq!(
            left,
            vec![
                "0 255 0",
                "255 127 0",
                "255 0 255",
                "0 127 255",
                "0 255 0",
                "255 255 255"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn write_failure_still_resets() {
        let device = RecordingDevice::new();
        let writer = device.writer().await;
        let token = CancellationToken::new();

        let effect = breathing();
        let (result, _) = tokio::join!(run(&effect, &writer, &token), async {
            time::sleep(Duration::from_millis(150)).await;
            device.set_failing(true);
            token.cancel();
        });

        // Cancellation wins over the next frame, the failing reset is still attempted
        assert!(matches!(
            result,
            Err(EffectError::Hardware(HardwareError::WriteFailed { .. }))
        ));
        assert_eq!(device.resets(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn write_failure_aborts_loop() {
        let device = RecordingDevice::new();
        device.set_failing(true);
        let writer = device.writer().await;
        let token = CancellationToken::new();

        let result = run(&breathing(), &writer, &token).await;

        assert!(matches!(
            result,
            Err(EffectError::Hardware(HardwareError::WriteFailed {
                zone: Zone::Left,
                ..
            }))
        ));
        // The first frame write, then the attempted reset
        assert_eq!(device.writes().len(), 2);
        assert_eq!(device.resets(), 1);
    }

    #[tokio::test]
    async fn one_shot_effects_are_rejected() {
        let device = RecordingDevice::new();
        let writer = device.writer().await;

        let result = run_frames(&Effect::RainbowStatic, &writer, &CancellationToken::new()).await;
        assert!(matches!(result, Err(EffectError::NotLooped("rainbow-static"))));
        assert!(device.writes().is_empty());
    }
}
