use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde_derive::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use super::{ColorOrder, Zone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// LED class attributes under sysfs
    Sysfs,
    /// Log writes instead of touching hardware
    Dummy,
}

impl Default for DeviceKind {
    fn default() -> Self {
        Self::Sysfs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DummyDeviceMode {
    Text,
    Ansi,
}

impl Default for DummyDeviceMode {
    fn default() -> Self {
        Self::Text
    }
}

/// LED class directory name of each zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct ZoneDirectories {
    #[validate(length(min = 1))]
    pub left: String,
    #[validate(length(min = 1))]
    pub center: String,
    #[validate(length(min = 1))]
    pub right: String,
}

impl ZoneDirectories {
    pub fn get(&self, zone: Zone) -> &str {
        match zone {
            Zone::Left => &self.left,
            Zone::Center => &self.center,
            Zone::Right => &self.right,
        }
    }
}

impl Default for ZoneDirectories {
    fn default() -> Self {
        Self {
            left: "rgb:kbd_backlight".to_owned(),
            center: "rgb:kbd_backlight_1".to_owned(),
            right: "rgb:kbd_backlight_2".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    pub kind: DeviceKind,
    pub dummy_mode: DummyDeviceMode,
    pub root: PathBuf,
    #[validate(length(min = 1))]
    pub attribute: String,
    pub color_order: ColorOrder,
    #[validate(nested)]
    pub zones: ZoneDirectories,
}

impl DeviceConfig {
    /// Full path of the intensity attribute controlling `zone`
    pub fn attribute_path(&self, zone: Zone) -> PathBuf {
        let mut path = self.root.clone();
        path.push(self.zones.get(zone));
        path.push(&self.attribute);
        path
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            kind: DeviceKind::default(),
            dummy_mode: DummyDeviceMode::default(),
            root: PathBuf::from("/sys/class/leds"),
            attribute: "multi_intensity".to_owned(),
            color_order: ColorOrder::default(),
            zones: ZoneDirectories::default(),
        }
    }
}

/// Timing of a looped effect: one cycle lasts `duration` seconds, split in `steps` frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoopConfig {
    #[validate(range(exclusive_min = 0.0))]
    pub duration: f64,
    #[validate(range(min = 1))]
    pub steps: u32,
}

impl LoopConfig {
    pub fn new(duration: f64, steps: u32) -> Self {
        Self { duration, steps }
    }

    /// Time between two frames, `None` if the duration cannot be represented
    pub fn frame_interval(&self) -> Option<Duration> {
        if self.steps == 0 {
            return None;
        }

        Duration::try_from_secs_f64(self.duration / f64::from(self.steps))
            .ok()
            .filter(|interval| !interval.is_zero())
    }
}

fn default_breathing() -> LoopConfig {
    LoopConfig::new(3.0, 50)
}

fn default_rainbow_wave() -> LoopConfig {
    LoopConfig::new(5.0, 100)
}

fn default_color_cycle() -> LoopConfig {
    LoopConfig::new(5.0, 100)
}

fn default_scheme() -> String {
    "sunset".to_owned()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EffectsConfig {
    #[serde(default = "default_breathing")]
    #[validate(nested)]
    pub breathing: LoopConfig,
    #[serde(default = "default_rainbow_wave")]
    #[validate(nested)]
    pub rainbow_wave: LoopConfig,
    #[serde(default = "default_color_cycle")]
    #[validate(nested)]
    pub color_cycle: LoopConfig,
    #[serde(default = "default_scheme")]
    pub default_scheme: String,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            breathing: default_breathing(),
            rainbow_wave: default_rainbow_wave(),
            color_cycle: default_color_cycle(),
            default_scheme: default_scheme(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[validate(nested)]
    pub device: DeviceConfig,
    #[validate(nested)]
    pub effects: EffectsConfig,
}

impl Config {
    /// Path of the per-user configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("tuxedo-rgb");
            path.push("config.toml");
            path
        })
    }

    /// Load the configuration from `path` if given, else from the per-user file if it exists,
    /// else fall back to built-in defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load_file(path).await;
        }

        if let Some(path) = Self::default_path() {
            if tokio::fs::metadata(&path).await.is_ok() {
                debug!(path = %path.display(), "loading user configuration");
                return Self::load_file(&path).await;
            }
        }

        Ok(Self::default())
    }

    pub async fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let full = tokio::fs::read_to_string(path).await?;
        Self::from_toml(&full)
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
