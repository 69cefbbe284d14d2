use std::f64::consts::PI;

use crate::{
    color::{self, ColorF},
    models::{Color, LoopConfig, Zone},
};

use super::schemes::{self, Scheme, SchemeError};

/// Colors produced by one frame of an effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    /// Same color on every zone
    All(Color),
    /// One color per zone, indexed by [Zone::index]
    Zones([Color; 3]),
}

impl Frame {
    pub fn zone(&self, zone: Zone) -> Color {
        match self {
            Frame::All(color) => *color,
            Frame::Zones(colors) => colors[zone.index()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Solid {
        color: Color,
    },
    Breathing {
        color: Color,
        cycle: LoopConfig,
    },
    RainbowStatic,
    RainbowWave {
        cycle: LoopConfig,
    },
    ColorCycle {
        scheme: &'static Scheme,
        cycle: LoopConfig,
    },
}

impl Effect {
    /// Color cycle through the scheme called `name`
    pub fn color_cycle(name: &str, cycle: LoopConfig) -> Result<Self, SchemeError> {
        Ok(Self::ColorCycle {
            scheme: schemes::find(name)?,
            cycle,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Effect::Solid { .. } => "solid",
            Effect::Breathing { .. } => "breathing",
            Effect::RainbowStatic => "rainbow-static",
            Effect::RainbowWave { .. } => "rainbow-wave",
            Effect::ColorCycle { .. } => "color-cycle",
        }
    }

    /// Timing of the effect, `None` for effects that are applied once
    pub fn cycle(&self) -> Option<&LoopConfig> {
        match self {
            Effect::Solid { .. } | Effect::RainbowStatic => None,
            Effect::Breathing { cycle, .. }
            | Effect::RainbowWave { cycle }
            | Effect::ColorCycle { cycle, .. } => Some(cycle),
        }
    }

    pub fn is_looped(&self) -> bool {
        self.cycle().is_some()
    }

    /// Compute the frame at animation time `t`, in [0, 1)
    pub fn frame(&self, t: f64) -> Frame {
        match self {
            Effect::Solid { color } => Frame::All(*color),
            Effect::Breathing { color, .. } => Frame::All(breathing(*color, t)),
            Effect::RainbowStatic => Frame::Zones(rainbow(0.0)),
            Effect::RainbowWave { .. } => Frame::Zones(rainbow(t)),
            Effect::ColorCycle { scheme, .. } => Frame::All(color_cycle(&scheme.colors, t)),
        }
    }

    /// Compute frame `i` of a cycle split in `steps` frames
    pub fn step(&self, i: u32, steps: u32) -> Frame {
        match self {
            Effect::Breathing { color, .. } => {
                Frame::All(color::scale(*color, breathing_step_scale(i, steps)))
            }
            _ => self.frame(f64::from(i) / f64::from(steps)),
        }
    }
}

/// Brightness of the breathing effect at time `t`, in [0, 1]
pub fn breathing_scale(t: f64) -> f64 {
    ((2.0 * PI * t).sin() + 1.0) / 2.0
}

/// Same as [breathing_scale] at `i / steps`, computed as `sin(i * 2 * PI / steps)`
pub fn breathing_step_scale(i: u32, steps: u32) -> f64 {
    ((f64::from(i) * 2.0 * PI / f64::from(steps)).sin() + 1.0) / 2.0
}

pub fn breathing(color: Color, t: f64) -> Color {
    color::scale(color, breathing_scale(t))
}

/// Three colors a third of the color wheel apart, starting at `hue`
pub fn rainbow(hue: f64) -> [Color; 3] {
    [0.0, 1.0 / 3.0, 2.0 / 3.0].map(|offset| color::color_to8(color::hue_to_rgb(hue + offset)))
}

/// Blend of the two palette entries surrounding position `t`
///
/// # Panics
///
/// Panics if `colors` is empty. Registered schemes never are.
pub fn color_cycle(colors: &[ColorF], t: f64) -> Color {
    let n = colors.len();
    let pos = t.rem_euclid(1.0) * n as f64;
    let first = pos.floor();
    let weight = pos - first;

    let first = first as usize % n;
    let second = (first + 1) % n;

    color::color_to8(color::lerp(colors[first], colors[second], weight))
}
