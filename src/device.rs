use std::{io, path::PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{self, Color, ColorError, ColorOrder, DeviceConfig, Zone};

// Device implementation modules

mod dummy;
mod sysfs;

#[derive(Debug, Error)]
pub enum HardwareError {
    #[error(
        "required path {} for the {zone} zone is missing or not writable, please ensure the tuxedo-keyboard module is loaded",
        .path.display()
    )]
    HardwareUnavailable { zone: Zone, path: PathBuf },
    #[error("invalid zone: {0} (expected left, center or right)")]
    InvalidZone(String),
    #[error(transparent)]
    InvalidColor(#[from] ColorError),
    #[error("failed to set color for {zone} zone: {source}")]
    WriteFailed {
        zone: Zone,
        #[source]
        source: io::Error,
    },
}

/// Hardware backend of a [ZoneWriter]
#[async_trait]
pub trait DeviceImpl: Send + Sync {
    /// Check that the control surface of `zone` is present and writable
    async fn check(&self, zone: Zone) -> Result<(), HardwareError>;

    /// Write the already serialized `payload` for `zone`. `color` is the logical color the
    /// payload was built from.
    async fn write(&self, zone: Zone, color: Color, payload: &str) -> io::Result<()>;
}

/// Pushes colors to the keyboard zones
///
/// The writer holds no per-animation state, so a shared reference can be handed to whichever
/// task currently drives the keyboard.
pub struct ZoneWriter {
    name: &'static str,
    inner: Box<dyn DeviceImpl>,
    order: ColorOrder,
}

impl ZoneWriter {
    fn build_inner(config: &DeviceConfig) -> (&'static str, Box<dyn DeviceImpl>) {
        match config.kind {
            models::DeviceKind::Sysfs => ("sysfs", Box::new(sysfs::SysfsDevice::new(config))),
            models::DeviceKind::Dummy => (
                "dummy",
                Box::new(dummy::DummyDevice::new(config.dummy_mode)),
            ),
        }
    }

    /// Build the writer described by `config` and verify its hardware surface
    #[instrument(skip(config))]
    pub async fn new(config: &DeviceConfig) -> Result<Self, HardwareError> {
        let (name, inner) = Self::build_inner(config);
        Self::with_device(name, inner, config.color_order).await
    }

    /// Wrap a custom backend, verifying it before returning
    pub async fn with_device(
        name: &'static str,
        inner: Box<dyn DeviceImpl>,
        order: ColorOrder,
    ) -> Result<Self, HardwareError> {
        let writer = Self { name, inner, order };
        writer.verify().await?;
        Ok(writer)
    }

    /// Check that every zone's control attribute is present and writable
    pub async fn verify(&self) -> Result<(), HardwareError> {
        for zone in Zone::ALL {
            self.inner.check(zone).await?;
        }

        debug!(device = self.name, "all zones present");
        Ok(())
    }

    /// Serialize `color` the way the hardware expects it
    pub fn payload(&self, color: Color) -> String {
        let (a, b, c) = self.order.reorder_from_rgb(color);
        format!("{} {} {}", a, b, c)
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn set_zone(&self, zone: Zone, color: Color) -> Result<(), HardwareError> {
        let payload = self.payload(color);

        self.inner
            .write(zone, color, &payload)
            .await
            .map_err(|source| HardwareError::WriteFailed { zone, source })
    }

    /// Same as [Self::set_zone], for a zone given by name
    pub async fn set_zone_by_name(&self, zone: &str, color: Color) -> Result<(), HardwareError> {
        let zone = zone
            .parse::<Zone>()
            .map_err(|_| HardwareError::InvalidZone(zone.to_owned()))?;

        self.set_zone(zone, color).await
    }

    /// Set every zone to `color`, in [Zone::ALL] order
    ///
    /// Stops at the first failure. Zones written before the failing one keep their new color.
    #[instrument(level = "trace", skip(self))]
    pub async fn set_all(&self, color: Color) -> Result<(), HardwareError> {
        for zone in Zone::ALL {
            self.set_zone(zone, color).await?;
        }

        Ok(())
    }

    /// Set each zone to its own color, indexed by [Zone::index]
    pub async fn set_zones(&self, colors: [Color; 3]) -> Result<(), HardwareError> {
        for zone in Zone::ALL {
            self.set_zone(zone, colors[zone.index()]).await?;
        }

        Ok(())
    }

    /// Bring the keyboard back to plain white
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<(), HardwareError> {
        self.set_all(models::white()).await
    }
}

impl std::fmt::Debug for ZoneWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneWriter")
            .field("name", &self.name)
            .field("order", &self.order)
            .finish()
    }
}
