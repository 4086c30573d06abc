//! Safety layer: validates mode values against the set each model accepts
//! before any frame is built.
//!
//! Mode toggles write straight into the keyboard's firmware state, so an
//! out-of-range value is rejected rather than clamped. Nothing invalid
//! ever reaches the device.

use crate::error::{Error, Result};
use crate::protocol::ModeValues;

/// Validate a mode value and convert it to the byte sent on the wire.
pub fn validate_mode_value(field: &'static str, values: ModeValues, value: u8) -> Result<u8> {
    let (min, max) = match values {
        ModeValues::Range { min, max } => (min, max),
        ModeValues::OneHot { max } => (1, max),
    };
    if !(min..=max).contains(&value) {
        return Err(Error::OutOfRange {
            field,
            value: u32::from(value),
            min: u32::from(min),
            max: u32::from(max),
        });
    }
    Ok(match values {
        ModeValues::Range { .. } => value,
        ModeValues::OneHot { .. } => 1 << (value - 1),
    })
}
