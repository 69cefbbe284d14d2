use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

mod config;
pub use config::*;

pub type Color = palette::rgb::LinSrgb<u8>;

/// Safe known state of the keyboard
pub fn white() -> Color {
    Color::new(255, 255, 255)
}

/// One of the independently addressable keyboard backlight regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Zone {
    Left,
    Center,
    Right,
}

impl Zone {
    /// All zones, in the order they are written to
    pub const ALL: [Zone; 3] = [Zone::Left, Zone::Center, Zone::Right];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("{channel} channel value {value} is out of range, must be between 0 and 255")]
    OutOfRange { channel: &'static str, value: i64 },
    #[error("invalid color format '{0}', expected R,G,B (e.g. 255,0,0 for red)")]
    Format(String),
}

fn channel(channel: &'static str, value: i64) -> Result<u8, ColorError> {
    u8::try_from(value).map_err(|_| ColorError::OutOfRange { channel, value })
}

/// Build a color from untyped channel values, rejecting anything outside 0-255
pub fn color_from_channels(red: i64, green: i64, blue: i64) -> Result<Color, ColorError> {
    Ok(Color::new(
        channel("red", red)?,
        channel("green", green)?,
        channel("blue", blue)?,
    ))
}

/// Parse a color written as `R,G,B`
pub fn parse_color(s: &str) -> Result<Color, ColorError> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ColorError::Format(s.to_owned()))?;

    match values.as_slice() {
        &[r, g, b] => color_from_channels(r, g, b),
        _ => Err(ColorError::Format(s.to_owned())),
    }
}

/// Channel order expected by the hardware when serializing a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorOrder {
    Rgb,
    Bgr,
    Rbg,
    Brg,
    Gbr,
    Grb,
}

impl ColorOrder {
    pub fn reorder_from_rgb(&self, color: Color) -> (u8, u8, u8) {
        let (r, g, b) = color.into_components();

        match self {
            ColorOrder::Rgb => (r, g, b),
            ColorOrder::Bgr => (b, g, r),
            ColorOrder::Rbg => (r, b, g),
            ColorOrder::Brg => (b, r, g),
            ColorOrder::Gbr => (g, b, r),
            ColorOrder::Grb => (g, r, b),
        }
    }
}

impl Default for ColorOrder {
    // The tuxedo-keyboard multi_intensity attribute takes green first
    fn default() -> Self {
        Self::Grb
    }
}
