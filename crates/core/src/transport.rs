//! Transport abstraction for device communication.
//!
//! A [`Backend`] enumerates candidate devices and opens a [`Transport`]
//! for the one a session resolves. Real HID devices, raw USB devices and
//! the test mock share the same interface.

use crate::config::TransportConfig;
use crate::device::{DeviceInfo, RawDevice};
use crate::error::Result;
use crate::report::Frame;
use std::time::Duration;
use tracing::trace;

/// An open handle to one keyboard interface.
pub trait Transport: Send {
    /// Write one complete output report.
    fn write_report(&mut self, data: &[u8]) -> Result<()>;

    /// Read an input report, returning the number of bytes received.
    fn read_interrupt(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Release the handle.
    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// A way of finding and opening keyboards.
pub trait Backend {
    fn name(&self) -> &'static str;

    /// List every attached device the backend can see.
    fn enumerate(&mut self) -> Result<Vec<RawDevice>>;

    /// Open a transport to a resolved device.
    fn open(&mut self, device: &DeviceInfo, config: &TransportConfig) -> Result<Box<dyn Transport>>;

    /// Whether an opened transport stays valid between writes.
    fn keeps_handle_open(&self) -> bool {
        true
    }
}

/// Write one frame, then drain whatever the keyboard answers.
///
/// Drain failures are ignored; only the write decides the result.
pub fn send_frame(transport: &mut dyn Transport, frame: &Frame, config: &TransportConfig) -> Result<()> {
    trace!(
        report_id = format_args!("0x{:02X}", frame.report_id()),
        report_hex = format_args!("{:02X?}", frame.as_bytes()),
        "report TX"
    );
    transport.write_report(frame.as_bytes())?;

    if config.drain {
        if !config.settle_delay().is_zero() {
            std::thread::sleep(config.settle_delay());
        }
        let mut buf = vec![0u8; config.drain_len];
        match transport.read_interrupt(&mut buf, config.drain_timeout()) {
            Ok(n) if n > 0 => trace!(report_hex = format_args!("{:02X?}", &buf[..n]), "report RX"),
            Ok(_) => {}
            Err(e) => trace!(error = %e, "drain read failed"),
        }
    }
    Ok(())
}

/// A mock backend for testing.
///
/// Records every open, write and close in a shared [`IoLog`].
#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::error::Error;
    use crate::LOGITECH_VID;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    pub struct IoLog {
        /// Every attempted write, failed ones included.
        pub writes: Vec<Vec<u8>>,
        pub opens: usize,
        pub closes: usize,
        pub drains: usize,
    }

    pub struct MockBackend {
        pub candidates: Vec<RawDevice>,
        pub deny_open: bool,
        pub keeps_handle: bool,
        /// Zero-based indices of write attempts that fail.
        pub failing_writes: HashSet<usize>,
        log: Arc<Mutex<IoLog>>,
    }

    /// A Logitech candidate with a predictable path and serial.
    pub fn keyboard(product_id: u16, interface: i32) -> RawDevice {
        RawDevice {
            vendor_id: LOGITECH_VID,
            product_id,
            interface_number: Some(interface),
            serial_number: Some(format!("SN{product_id:04X}")),
            manufacturer: Some("Logitech".into()),
            product: Some(format!("Keyboard {product_id:04X}")),
            path: format!("/dev/mock-{product_id:04x}-{interface}"),
        }
    }

    impl MockBackend {
        pub fn new(candidates: Vec<RawDevice>) -> Self {
            Self {
                candidates,
                deny_open: false,
                keeps_handle: true,
                failing_writes: HashSet::new(),
                log: Arc::new(Mutex::new(IoLog::default())),
            }
        }

        pub fn log(&self) -> Arc<Mutex<IoLog>> {
            Arc::clone(&self.log)
        }
    }

    struct MockTransport {
        log: Arc<Mutex<IoLog>>,
        failing_writes: HashSet<usize>,
    }

    impl Transport for MockTransport {
        fn write_report(&mut self, data: &[u8]) -> Result<()> {
            let mut log = self.log.lock().unwrap();
            let index = log.writes.len();
            log.writes.push(data.to_vec());
            if self.failing_writes.contains(&index) {
                return Err(Error::Transport(format!("mock: write {index} failed")));
            }
            Ok(())
        }

        fn read_interrupt(&mut self, _buf: &mut [u8], _timeout: Duration) -> Result<usize> {
            self.log.lock().unwrap().drains += 1;
            Ok(0)
        }

        fn close(self: Box<Self>) -> Result<()> {
            self.log.lock().unwrap().closes += 1;
            Ok(())
        }
    }

    impl Backend for MockBackend {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn enumerate(&mut self) -> Result<Vec<RawDevice>> {
            Ok(self.candidates.clone())
        }

        fn open(&mut self, device: &DeviceInfo, _config: &TransportConfig) -> Result<Box<dyn Transport>> {
            if self.deny_open {
                return Err(Error::AccessDenied(format!("mock: {}", device.path)));
            }
            self.log.lock().unwrap().opens += 1;
            Ok(Box::new(MockTransport {
                log: Arc::clone(&self.log),
                failing_writes: self.failing_writes.clone(),
            }))
        }

        fn keeps_handle_open(&self) -> bool {
            self.keeps_handle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{keyboard, MockBackend};
    use super::*;
    use crate::device::resolve;
    use crate::device::DeviceFilter;
    use crate::pids;
    use crate::report::LONG_REPORT_ID;

    fn open_mock(backend: &mut MockBackend, config: &TransportConfig) -> Box<dyn Transport> {
        let info = resolve(backend.enumerate().unwrap(), &DeviceFilter::any()).unwrap();
        backend.open(&info, config).unwrap()
    }

    #[test]
    fn send_frame_writes_and_drains() {
        let mut backend = MockBackend::new(vec![keyboard(pids::G810, 1)]);
        let log = backend.log();
        let config = TransportConfig {
            settle_delay_ms: 0,
            ..TransportConfig::default()
        };
        let mut transport = open_mock(&mut backend, &config);
        let frame = Frame::long(&[LONG_REPORT_ID, 0xFF, 0x0C, 0x5A]);
        send_frame(transport.as_mut(), &frame, &config).unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.writes, vec![frame.as_bytes().to_vec()]);
        assert_eq!(log.drains, 1);
    }

    #[test]
    fn send_frame_skips_drain_when_disabled() {
        let mut backend = MockBackend::new(vec![keyboard(pids::G810, 1)]);
        let log = backend.log();
        let config = TransportConfig {
            drain: false,
            ..TransportConfig::default()
        };
        let mut transport = open_mock(&mut backend, &config);
        send_frame(transport.as_mut(), &Frame::long(&[LONG_REPORT_ID]), &config).unwrap();
        assert_eq!(log.lock().unwrap().drains, 0);
    }

    #[test]
    fn send_frame_propagates_write_failure() {
        let mut backend = MockBackend::new(vec![keyboard(pids::G810, 1)]);
        backend.failing_writes.insert(0);
        let config = TransportConfig::default();
        let mut transport = open_mock(&mut backend, &config);
        assert!(send_frame(transport.as_mut(), &Frame::long(&[LONG_REPORT_ID]), &config).is_err());
    }
}
