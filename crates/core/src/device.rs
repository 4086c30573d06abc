//! Device model: supported keyboards, the matching catalog, and discovery.

use crate::error::Result;
use crate::transport::Backend;
use crate::{pids, LOGITECH_VID};
use serde::Serialize;
use tracing::{debug, info};

/// Supported Logitech keyboard families.
///
/// The model decides every encoding choice downstream and is only ever
/// derived from the catalog, never from descriptive strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardModel {
    G213,
    G410,
    G413,
    G512,
    G513,
    G610,
    G810,
    G815,
    G910,
    G915,
    GPro,
}

impl KeyboardModel {
    /// All supported models.
    pub const ALL: &'static [KeyboardModel] = &[
        KeyboardModel::G213,
        KeyboardModel::G410,
        KeyboardModel::G413,
        KeyboardModel::G512,
        KeyboardModel::G513,
        KeyboardModel::G610,
        KeyboardModel::G810,
        KeyboardModel::G815,
        KeyboardModel::G910,
        KeyboardModel::G915,
        KeyboardModel::GPro,
    ];

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::G213 => "Logitech G213 Prodigy",
            Self::G410 => "Logitech G410 Atlas Spectrum",
            Self::G413 => "Logitech G413 Carbon",
            Self::G512 => "Logitech G512",
            Self::G513 => "Logitech G513",
            Self::G610 => "Logitech G610 Orion",
            Self::G810 => "Logitech G810 Orion Spectrum",
            Self::G815 => "Logitech G815 LIGHTSYNC",
            Self::G910 => "Logitech G910 Orion Spectrum",
            Self::G915 => "Logitech G915 LIGHTSPEED",
            Self::GPro => "Logitech G Pro",
        }
    }
}

impl std::fmt::Display for KeyboardModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One row of the device matching table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub vendor_id: u16,
    pub product_id: u16,
    /// USB interface carrying the lighting endpoint.
    pub interface: u8,
    pub model: KeyboardModel,
}

const fn entry(product_id: u16, interface: u8, model: KeyboardModel) -> CatalogEntry {
    CatalogEntry {
        vendor_id: LOGITECH_VID,
        product_id,
        interface,
        model,
    }
}

/// Ordered matching table. New models are added here only.
pub const SUPPORTED_KEYBOARDS: &[CatalogEntry] = &[
    entry(pids::G213, 1, KeyboardModel::G213),
    entry(pids::G410, 1, KeyboardModel::G410),
    entry(pids::G413, 1, KeyboardModel::G413),
    entry(pids::G512, 1, KeyboardModel::G512),
    entry(pids::G513, 1, KeyboardModel::G513),
    entry(pids::G610, 1, KeyboardModel::G610),
    entry(pids::G610_BROWN, 1, KeyboardModel::G610),
    entry(pids::G810, 1, KeyboardModel::G810),
    entry(pids::G810_REV2, 1, KeyboardModel::G810),
    entry(pids::G815, 1, KeyboardModel::G815),
    entry(pids::G910_SPARK, 1, KeyboardModel::G910),
    entry(pids::G910_SPECTRUM, 1, KeyboardModel::G910),
    entry(pids::G915_RECEIVER, 2, KeyboardModel::G915),
    entry(pids::G915_WIRED, 2, KeyboardModel::G915),
    entry(pids::G_PRO, 1, KeyboardModel::GPro),
];

/// Find the catalog entry for an enumerated device.
///
/// Backends that enumerate whole devices rather than interfaces pass
/// `interface = None` and match on (vendor, product) alone.
pub fn lookup(vendor_id: u16, product_id: u16, interface: Option<i32>) -> Option<&'static CatalogEntry> {
    SUPPORTED_KEYBOARDS.iter().find(|e| {
        e.vendor_id == vendor_id
            && e.product_id == product_id
            && interface.map_or(true, |i| i == i32::from(e.interface))
    })
}

/// A device (or device interface) as reported by a backend's enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDevice {
    pub vendor_id: u16,
    pub product_id: u16,
    pub interface_number: Option<i32>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    /// Backend-specific handle locator (hidraw path, `bus:address`, ...).
    pub path: String,
}

/// Information about a discovered, supported keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub model: KeyboardModel,
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub path: String,
    /// Interface the session claims and writes to.
    pub interface: u8,
}

impl DeviceInfo {
    fn from_raw(raw: RawDevice, entry: &CatalogEntry) -> Self {
        Self {
            model: entry.model,
            vendor_id: raw.vendor_id,
            product_id: raw.product_id,
            serial_number: raw.serial_number,
            manufacturer: raw.manufacturer,
            product: raw.product,
            path: raw.path,
            interface: entry.interface,
        }
    }
}

/// Selection criteria for `open`. Zero ids and an empty serial are wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial: String,
}

impl DeviceFilter {
    /// Match any supported keyboard.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn matches(&self, raw: &RawDevice) -> bool {
        if self.vendor_id != 0 && raw.vendor_id != self.vendor_id {
            return false;
        }
        if self.product_id != 0 && raw.product_id != self.product_id {
            return false;
        }
        // A device without a serial never satisfies a serial filter.
        self.serial.is_empty() || raw.serial_number.as_deref() == Some(self.serial.as_str())
    }
}

/// Pick the first candidate, in enumeration order, that passes the filter
/// and is a known keyboard.
pub fn resolve(candidates: Vec<RawDevice>, filter: &DeviceFilter) -> Option<DeviceInfo> {
    candidates.into_iter().find_map(|raw| {
        if !filter.matches(&raw) {
            return None;
        }
        let entry = lookup(raw.vendor_id, raw.product_id, raw.interface_number)?;
        Some(DeviceInfo::from_raw(raw, entry))
    })
}

/// Discover all connected supported keyboards.
///
/// Descriptive strings are best-effort; a missing serial or product
/// string is not an error.
pub fn discover_devices(backend: &mut dyn Backend) -> Result<Vec<DeviceInfo>> {
    debug!(backend = backend.name(), "Starting device enumeration");

    let mut devices = Vec::new();
    for raw in backend.enumerate()? {
        let Some(entry) = lookup(raw.vendor_id, raw.product_id, raw.interface_number) else {
            continue;
        };
        info!(
            model = entry.model.name(),
            vid = format_args!("0x{:04X}", raw.vendor_id),
            pid = format_args!("0x{:04X}", raw.product_id),
            path = %raw.path,
            "Found Logitech keyboard"
        );
        devices.push(DeviceInfo::from_raw(raw, entry));
    }

    debug!(count = devices.len(), "Device enumeration complete");
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pid: u16, iface: Option<i32>, serial: Option<&str>) -> RawDevice {
        RawDevice {
            vendor_id: LOGITECH_VID,
            product_id: pid,
            interface_number: iface,
            serial_number: serial.map(str::to_string),
            path: format!("/dev/hidraw-{pid:04x}-{iface:?}"),
            ..RawDevice::default()
        }
    }

    #[test]
    fn lookup_matches_full_triple() {
        let e = lookup(LOGITECH_VID, pids::G810, Some(1)).unwrap();
        assert_eq!(e.model, KeyboardModel::G810);
        assert!(lookup(LOGITECH_VID, pids::G810, Some(0)).is_none());
    }

    #[test]
    fn lookup_without_interface_matches_ids() {
        let e = lookup(LOGITECH_VID, pids::G915_WIRED, None).unwrap();
        assert_eq!(e.model, KeyboardModel::G915);
        assert_eq!(e.interface, 2);
    }

    #[test]
    fn lookup_unknown_pid() {
        assert!(lookup(LOGITECH_VID, 0x1234, None).is_none());
        assert!(lookup(0x1234, pids::G810, Some(1)).is_none());
    }

    #[test]
    fn every_model_has_a_catalog_entry() {
        for model in KeyboardModel::ALL {
            assert!(SUPPORTED_KEYBOARDS.iter().any(|e| e.model == *model));
        }
    }

    #[test]
    fn filter_wildcards_match_everything() {
        assert!(DeviceFilter::any().matches(&raw(pids::G213, Some(1), None)));
    }

    #[test]
    fn filter_serial_requires_exact_match() {
        let filter = DeviceFilter {
            serial: "ABC".into(),
            ..DeviceFilter::default()
        };
        assert!(filter.matches(&raw(pids::G213, Some(1), Some("ABC"))));
        assert!(!filter.matches(&raw(pids::G213, Some(1), Some("ABCD"))));
        assert!(!filter.matches(&raw(pids::G213, Some(1), None)));
    }

    #[test]
    fn resolve_takes_first_in_enumeration_order() {
        let candidates = vec![
            raw(pids::G810, Some(0), None),
            raw(pids::G915_WIRED, Some(2), None),
            raw(pids::G810, Some(1), None),
        ];
        let dev = resolve(candidates, &DeviceFilter::any()).unwrap();
        assert_eq!(dev.model, KeyboardModel::G915);
        assert_eq!(dev.interface, 2);
    }

    #[test]
    fn resolve_honours_product_filter() {
        let candidates = vec![raw(pids::G915_WIRED, Some(2), None), raw(pids::G810, Some(1), None)];
        let filter = DeviceFilter {
            product_id: pids::G810,
            ..DeviceFilter::default()
        };
        assert_eq!(resolve(candidates, &filter).unwrap().model, KeyboardModel::G810);
    }

    #[test]
    fn resolve_returns_none_for_unknown_devices() {
        assert!(resolve(vec![raw(0x0001, Some(1), None)], &DeviceFilter::any()).is_none());
    }
}
