//! libusb backend (cargo feature `libusb`).
//!
//! Reports go out as HID SET_REPORT control transfers on the model's
//! lighting interface, and the interrupt IN endpoint is drained after
//! each one. The kernel driver is detached while the interface is
//! claimed and re-attached when the claim is released.

use crate::config::TransportConfig;
use crate::device::{lookup, DeviceInfo, RawDevice};
use crate::error::{Error, Result};
use crate::protocol::protocol;
use crate::report::{LONG_REPORT_ID, LONG_REPORT_LEN, VERY_LONG_REPORT_ID};
use crate::transport::{Backend, Transport};
use rusb::{Context, Device, DeviceHandle, Direction, Recipient, RequestType, UsbContext};
use std::time::Duration;
use tracing::{debug, warn};

/// HID class request SET_REPORT.
const SET_REPORT: u8 = 0x09;
/// Output report type in the high byte of wValue.
const REPORT_TYPE_OUTPUT: u16 = 0x0200;

fn usb_err(context: &str, e: rusb::Error) -> Error {
    match e {
        rusb::Error::Access => Error::AccessDenied(format!("{context}: {e}")),
        rusb::Error::NoDevice | rusb::Error::NotFound => Error::NotFound(format!("{context}: {e}")),
        _ => Error::Transport(format!("{context}: {e}")),
    }
}

/// Failures while acquiring a handle or interface: the device is gone,
/// or something else owns it.
fn acquire_err(context: &str, e: rusb::Error) -> Error {
    match e {
        rusb::Error::NoDevice | rusb::Error::NotFound => Error::NotFound(format!("{context}: {e}")),
        _ => Error::AccessDenied(format!("{context}: {e}")),
    }
}

fn bus_path(device: &Device<Context>) -> String {
    format!("{:03}:{:03}", device.bus_number(), device.address())
}

/// Backend talking to keyboards through libusb.
pub struct UsbBackend {
    context: Context,
}

impl UsbBackend {
    pub fn new() -> Result<Self> {
        let context = Context::new().map_err(|e| usb_err("libusb init", e))?;
        Ok(Self { context })
    }
}

impl Backend for UsbBackend {
    fn name(&self) -> &'static str {
        "libusb"
    }

    fn enumerate(&mut self) -> Result<Vec<RawDevice>> {
        let devices = self.context.devices().map_err(|e| usb_err("list devices", e))?;
        let mut raw = Vec::new();
        for device in devices.iter() {
            let Ok(desc) = device.device_descriptor() else {
                continue;
            };
            let mut entry = RawDevice {
                vendor_id: desc.vendor_id(),
                product_id: desc.product_id(),
                interface_number: None,
                path: bus_path(&device),
                ..RawDevice::default()
            };
            // Strings need an open handle; only read them for known keyboards.
            if lookup(entry.vendor_id, entry.product_id, None).is_some() {
                if let Ok(handle) = device.open() {
                    entry.serial_number = handle.read_serial_number_string_ascii(&desc).ok();
                    entry.manufacturer = handle.read_manufacturer_string_ascii(&desc).ok();
                    entry.product = handle.read_product_string_ascii(&desc).ok();
                }
            }
            raw.push(entry);
        }
        Ok(raw)
    }

    fn open(&mut self, device: &DeviceInfo, config: &TransportConfig) -> Result<Box<dyn Transport>> {
        let devices = self.context.devices().map_err(|e| usb_err("list devices", e))?;
        let usb_device = devices
            .iter()
            .find(|d| bus_path(d) == device.path)
            .ok_or_else(|| Error::NotFound(format!("USB device {} is gone", device.path)))?;

        let handle = usb_device.open().map_err(|e| acquire_err("open", e))?;
        let p = protocol(device.model);
        let claim = ClaimedInterface::claim(handle, p.usb_interface)?;
        debug!(
            path = %device.path,
            interface = p.usb_interface,
            endpoint = format_args!("0x{:02X}", p.interrupt_endpoint),
            "Claimed USB interface"
        );
        Ok(Box::new(UsbTransport {
            claim,
            endpoint: p.interrupt_endpoint,
            write_timeout: config.write_timeout(),
        }))
    }
}

/// A claimed interface. Dropping it releases the claim and hands the
/// interface back to the kernel driver if one was detached.
struct ClaimedInterface {
    handle: DeviceHandle<Context>,
    interface: u8,
    claimed: bool,
    reattach: bool,
}

impl ClaimedInterface {
    fn claim(handle: DeviceHandle<Context>, interface: u8) -> Result<Self> {
        let mut guard = Self {
            handle,
            interface,
            claimed: false,
            reattach: false,
        };
        // Platforms without kernel driver support report an error here.
        if guard.handle.kernel_driver_active(interface).unwrap_or(false) {
            guard
                .handle
                .detach_kernel_driver(interface)
                .map_err(|e| acquire_err("detach kernel driver", e))?;
            guard.reattach = true;
        }
        // On failure the guard drops here and re-attaches the driver.
        guard
            .handle
            .claim_interface(interface)
            .map_err(|e| acquire_err("claim interface", e))?;
        guard.claimed = true;
        Ok(guard)
    }

    fn release(&mut self) -> Result<()> {
        let mut result = Ok(());
        if self.claimed {
            self.claimed = false;
            result = self
                .handle
                .release_interface(self.interface)
                .map_err(|e| usb_err("release interface", e));
        }
        if self.reattach {
            self.reattach = false;
            if let Err(e) = self.handle.attach_kernel_driver(self.interface) {
                warn!(interface = self.interface, error = %e, "Failed to re-attach kernel driver");
            }
        }
        result
    }
}

impl Drop for ClaimedInterface {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "Failed to release USB interface");
        }
    }
}

struct UsbTransport {
    claim: ClaimedInterface,
    endpoint: u8,
    write_timeout: Duration,
}

impl Transport for UsbTransport {
    fn write_report(&mut self, data: &[u8]) -> Result<()> {
        let report_id = if data.len() > LONG_REPORT_LEN {
            VERY_LONG_REPORT_ID
        } else {
            LONG_REPORT_ID
        };
        let request_type = rusb::request_type(Direction::Out, RequestType::Class, Recipient::Interface);
        let written = self
            .claim
            .handle
            .write_control(
                request_type,
                SET_REPORT,
                REPORT_TYPE_OUTPUT | u16::from(report_id),
                u16::from(self.claim.interface),
                data,
                self.write_timeout,
            )
            .map_err(|e| usb_err("SET_REPORT", e))?;
        if written < data.len() {
            return Err(Error::Transport(format!(
                "short control transfer: {written} of {} bytes",
                data.len()
            )));
        }
        Ok(())
    }

    fn read_interrupt(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        self.claim
            .handle
            .read_interrupt(self.endpoint, buf, timeout)
            .map_err(|e| usb_err("interrupt read", e))
    }

    fn close(mut self: Box<Self>) -> Result<()> {
        self.claim.release()
    }
}
