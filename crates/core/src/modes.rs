//! Keyboard mode toggles: startup lighting, on-board memory mode, the
//! MR / M1-M3 macro keys, G-key mode, and G213 region colors.
//!
//! Each toggle is one fixed 20-byte frame with the value embedded at a
//! known offset:
//!   - startup mode: `11 tgt feat func 00 01 <mode>`
//!   - on-board mode: `11 tgt feat 1a <mode>`
//!   - MR / MN / G-keys: `11 tgt feat func <value>`
//!   - region: `11 tgt 0c 3a <region> 01 r g b`

use crate::device::KeyboardModel;
use crate::error::{Error, Result};
use crate::keys::Color;
use crate::protocol::{protocol, ModeToggle, ModeValues};
use crate::report::{Frame, LONG_REPORT_ID};
use crate::safety;
use std::ops::RangeInclusive;

/// Lighting shown when the keyboard powers up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StartupMode {
    Wave = 0x01,
    Color = 0x02,
}

impl StartupMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "wave" => Some(Self::Wave),
            "color" => Some(Self::Color),
            _ => None,
        }
    }
}

/// Whether lighting comes from on-board memory or from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OnBoardMode {
    /// Keyboard plays its stored profile.
    Board = 0x01,
    /// Host software controls lighting.
    Software = 0x02,
}

impl OnBoardMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "board" => Some(Self::Board),
            "software" => Some(Self::Software),
            _ => None,
        }
    }
}

fn unsupported(operation: &'static str, model: KeyboardModel) -> Error {
    Error::Unsupported { operation, model }
}

fn toggle_frame(
    model: KeyboardModel,
    toggle: Option<ModeToggle>,
    operation: &'static str,
    value: u8,
) -> Result<Frame> {
    let toggle = toggle.ok_or_else(|| unsupported(operation, model))?;
    let wire = safety::validate_mode_value(operation, toggle.values, value)?;
    let target = protocol(model).target;
    Ok(Frame::long(&[LONG_REPORT_ID, target, toggle.feature, toggle.function, wire]))
}

/// Lighting regions of a zoned keyboard, or `None` for per-key boards.
pub fn regions(model: KeyboardModel) -> Option<RangeInclusive<u8>> {
    match protocol(model).region?.values {
        ModeValues::Range { min, max } => Some(min..=max),
        ModeValues::OneHot { max } => Some(1..=max),
    }
}

/// Frame coloring one region of a zoned keyboard.
pub fn encode_region(model: KeyboardModel, region: u8, color: Color) -> Result<Frame> {
    let toggle = protocol(model)
        .region
        .ok_or_else(|| unsupported("region", model))?;
    let region = safety::validate_mode_value("region", toggle.values, region)?;
    let mut frame = Frame::long(&[
        LONG_REPORT_ID,
        protocol(model).target,
        toggle.feature,
        toggle.function,
        region,
        0x01,
    ]);
    frame.extend(&color.rgb());
    Ok(frame)
}

/// Frame selecting the power-up lighting.
pub fn encode_startup_mode(model: KeyboardModel, mode: StartupMode) -> Result<Frame> {
    let p = protocol(model);
    let cmd = p.startup.ok_or_else(|| unsupported("startup mode", model))?;
    Ok(Frame::long(&[
        LONG_REPORT_ID,
        p.target,
        cmd.feature,
        cmd.function,
        0x00,
        0x01,
        mode as u8,
    ]))
}

/// Frame switching between on-board and software lighting.
pub fn encode_onboard_mode(model: KeyboardModel, mode: OnBoardMode) -> Result<Frame> {
    let p = protocol(model);
    let cmd = p.onboard.ok_or_else(|| unsupported("on-board mode", model))?;
    Ok(Frame::long(&[LONG_REPORT_ID, p.target, cmd.feature, cmd.function, mode as u8]))
}

/// Frame lighting (1) or clearing (0) the MR key.
pub fn encode_mr_key(model: KeyboardModel, value: u8) -> Result<Frame> {
    toggle_frame(model, protocol(model).mr, "MR key", value)
}

/// Frame selecting the lit M-key (M1-M3 on LIGHTSYNC boards, bitmask 0-7 on the G910).
pub fn encode_mn_key(model: KeyboardModel, value: u8) -> Result<Frame> {
    toggle_frame(model, protocol(model).mn, "MN key", value)
}

/// Frame enabling (1) or disabling (0) the G-key macro mode.
pub fn encode_gkeys_mode(model: KeyboardModel, value: u8) -> Result<Frame> {
    toggle_frame(model, protocol(model).gkeys, "G-keys mode", value)
}
