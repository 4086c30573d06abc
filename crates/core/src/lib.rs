//! open-g-led-core: keyboard discovery, sessions, and lighting report encoding.
//!
//! This crate provides the cross-platform core logic for driving the
//! per-key RGB lighting of Logitech G keyboards over USB HID.

pub mod addressing;
pub mod config;
pub mod device;
pub mod effects;
pub mod encoder;
pub mod error;
pub mod hid;
#[cfg(test)]
mod integration_tests;
pub mod keys;
pub mod modes;
pub mod protocol;
pub mod report;
pub mod safety;
pub mod session;
pub mod transport;
#[cfg(feature = "libusb")]
pub mod usb;

pub use device::{DeviceFilter, DeviceInfo, KeyboardModel};
pub use effects::{NativeEffect, NativeEffectPart, NativeEffectStorage};
pub use keys::{Color, Key, KeyColor, KeyGroup};
pub use modes::{OnBoardMode, StartupMode};
pub use session::KeyboardSession;

/// Logitech USB Vendor ID.
pub const LOGITECH_VID: u16 = 0x046D;

/// Known Logitech keyboard product IDs.
pub mod pids {
    /// G213 Prodigy.
    pub const G213: u16 = 0xC336;
    /// G410 Atlas Spectrum.
    pub const G410: u16 = 0xC330;
    /// G413 Carbon.
    pub const G413: u16 = 0xC33A;
    /// G512.
    pub const G512: u16 = 0xC342;
    /// G513.
    pub const G513: u16 = 0xC33C;
    /// G610 Orion (Cherry MX Red).
    pub const G610: u16 = 0xC333;
    /// G610 Orion (Cherry MX Brown).
    pub const G610_BROWN: u16 = 0xC338;
    /// G810 Orion Spectrum.
    pub const G810: u16 = 0xC331;
    /// G810 Orion Spectrum (second hardware revision).
    pub const G810_REV2: u16 = 0xC337;
    /// G815 LIGHTSYNC.
    pub const G815: u16 = 0xC33F;
    /// G910 Orion Spark.
    pub const G910_SPARK: u16 = 0xC32B;
    /// G910 Orion Spectrum.
    pub const G910_SPECTRUM: u16 = 0xC335;
    /// G915 LIGHTSPEED (wireless receiver).
    pub const G915_RECEIVER: u16 = 0xC541;
    /// G915 (wired).
    pub const G915_WIRED: u16 = 0xC33E;
    /// G Pro.
    pub const G_PRO: u16 = 0xC339;
}
