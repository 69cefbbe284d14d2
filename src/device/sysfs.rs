use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use crate::models::{Color, DeviceConfig, Zone};

use super::{DeviceImpl, HardwareError};

/// LED class device, one intensity attribute per zone
pub struct SysfsDevice {
    paths: [PathBuf; 3],
}

impl SysfsDevice {
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            paths: Zone::ALL.map(|zone| config.attribute_path(zone)),
        }
    }

    fn path(&self, zone: Zone) -> &PathBuf {
        &self.paths[zone.index()]
    }
}

/// Check that `path` is a regular file the current user can open for writing
///
/// The file is not truncated and nothing is written to it.
async fn writable_attribute(path: &Path) -> io::Result<()> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }

    OpenOptions::new().write(true).open(path).await?;
    Ok(())
}

#[async_trait]
impl DeviceImpl for SysfsDevice {
    async fn check(&self, zone: Zone) -> Result<(), HardwareError> {
        let path = self.path(zone);

        match writable_attribute(path).await {
            Ok(()) => Ok(()),
            Err(error) => {
                debug!(path = %path.display(), error = %error, "zone attribute not accessible");

                Err(HardwareError::HardwareUnavailable {
                    zone,
                    path: path.clone(),
                })
            }
        }
    }

    async fn write(&self, zone: Zone, _color: Color, payload: &str) -> io::Result<()> {
        // Never create the attribute: it only exists while the driver is loaded
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.path(zone))
            .await?;

        file.write_all(payload.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}
