use std::{fmt::Write, io};

use async_trait::async_trait;

use crate::models::{Color, DummyDeviceMode, Zone};

use super::{DeviceImpl, HardwareError};

/// Device that only logs what would have been written
pub struct DummyDevice {
    mode: DummyDeviceMode,
}

impl DummyDevice {
    pub fn new(mode: DummyDeviceMode) -> Self {
        Self { mode }
    }
}

#[async_trait]
impl DeviceImpl for DummyDevice {
    async fn check(&self, _zone: Zone) -> Result<(), HardwareError> {
        Ok(())
    }

    async fn write(&self, zone: Zone, color: Color, payload: &str) -> io::Result<()> {
        match self.mode {
            DummyDeviceMode::Text => {
                info!(
                    zone = %zone,
                    red = %format_args!("{:3}", color.red),
                    green = %format_args!("{:3}", color.green),
                    blue = %format_args!("{:3}", color.blue),
                    payload,
                );
            }

            DummyDeviceMode::Ansi => {
                // Truecolor swatch for the zone
                let mut ansi_buf = String::new();
                write!(
                    &mut ansi_buf,
                    "\x1B[38;2;{red};{green};{blue}m████\x1B[0m",
                    red = color.red,
                    green = color.green,
                    blue = color.blue
                )
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "failed to format escape sequence"))?;

                info!(zone = %zone, "{}", ansi_buf);
            }
        }

        Ok(())
    }
}
