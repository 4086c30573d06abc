//! hidapi backend: the default way of reaching a keyboard.
//!
//! Reports are written as-is on the lighting interface; the first byte
//! is the report ID.

use crate::config::TransportConfig;
use crate::device::{DeviceInfo, RawDevice};
use crate::error::{Error, Result};
use crate::transport::{Backend, Transport};
use hidapi::{HidApi, HidDevice, HidError};
use std::ffi::CString;
use std::time::Duration;
use tracing::debug;

fn hid_err(context: &str, e: HidError) -> Error {
    Error::Transport(format!("{context}: {e}"))
}

/// Backend enumerating and opening hidraw interfaces through hidapi.
#[derive(Default)]
pub struct HidBackend {
    api: Option<HidApi>,
}

impl HidBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The hidapi context with a fresh device list.
    fn api(&mut self) -> Result<&HidApi> {
        if self.api.is_none() {
            self.api = Some(HidApi::new().map_err(|e| hid_err("hidapi init", e))?);
        } else if let Some(api) = self.api.as_mut() {
            api.refresh_devices().map_err(|e| hid_err("refresh devices", e))?;
        }
        self.api
            .as_ref()
            .ok_or_else(|| Error::Transport("hidapi unavailable".into()))
    }
}

impl Backend for HidBackend {
    fn name(&self) -> &'static str {
        "hidapi"
    }

    fn enumerate(&mut self) -> Result<Vec<RawDevice>> {
        let api = self.api()?;
        Ok(api
            .device_list()
            .map(|info| RawDevice {
                vendor_id: info.vendor_id(),
                product_id: info.product_id(),
                interface_number: Some(info.interface_number()),
                serial_number: info.serial_number().map(str::to_string),
                manufacturer: info.manufacturer_string().map(str::to_string),
                product: info.product_string().map(str::to_string),
                path: info.path().to_string_lossy().into_owned(),
            })
            .collect())
    }

    fn open(&mut self, device: &DeviceInfo, _config: &TransportConfig) -> Result<Box<dyn Transport>> {
        let path = CString::new(device.path.as_str())
            .map_err(|e| Error::NotFound(format!("invalid device path {:?}: {e}", device.path)))?;
        let api = self.api()?;
        let handle = api.open_path(&path).map_err(|e| {
            Error::AccessDenied(format!(
                "open {} (VID=0x{:04X} PID=0x{:04X}): {e}",
                device.path, device.vendor_id, device.product_id
            ))
        })?;
        debug!(path = %device.path, "Opened HID interface");
        Ok(Box::new(HidTransport { device: handle }))
    }
}

struct HidTransport {
    device: HidDevice,
}

impl Transport for HidTransport {
    fn write_report(&mut self, data: &[u8]) -> Result<()> {
        let written = self.device.write(data).map_err(|e| hid_err("write", e))?;
        if written < data.len() {
            return Err(Error::Transport(format!(
                "short write: {written} of {} bytes",
                data.len()
            )));
        }
        Ok(())
    }

    fn read_interrupt(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        self.device
            .read_timeout(buf, timeout_ms)
            .map_err(|e| hid_err("read_timeout", e))
    }
}
