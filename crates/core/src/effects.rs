//! Firmware-native lighting effects.
//!
//! An effect frame is 20 bytes:
//!
//! ```text
//! 11 tgt feat func part group r g b  P1 P0 P1 P0 variation 64 P1 storage 00 00 00
//! ```
//!
//! where `P1 P0` is the period in milliseconds, big-endian. LIGHTSYNC
//! boards need a setup frame first and rewrite a few bytes depending on
//! the part being lit.

use crate::device::KeyboardModel;
use crate::error::{Error, Result};
use crate::keys::Color;
use crate::protocol::protocol;
use crate::report::{Frame, LONG_REPORT_ID};
use std::time::Duration;

/// Effect families; the second byte of an effect code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NativeEffectGroup {
    Off = 0x00,
    Color = 0x01,
    Breathing = 0x02,
    Cycle = 0x03,
    Waves = 0x04,
    Ripple = 0x05,
}

/// A firmware effect: family in the high byte, variation in the low byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum NativeEffect {
    Off = 0x0000,
    Color = 0x0100,
    Breathing = 0x0200,
    Cycle = 0x0300,
    Waves = 0x0400,
    HWave = 0x0401,
    VWave = 0x0402,
    CWave = 0x0403,
    Ripple = 0x0500,
}

impl NativeEffect {
    pub fn group(self) -> NativeEffectGroup {
        match self as u16 >> 8 {
            0x01 => NativeEffectGroup::Color,
            0x02 => NativeEffectGroup::Breathing,
            0x03 => NativeEffectGroup::Cycle,
            0x04 => NativeEffectGroup::Waves,
            0x05 => NativeEffectGroup::Ripple,
            _ => NativeEffectGroup::Off,
        }
    }

    pub fn variation(self) -> u8 {
        (self as u16 & 0xFF) as u8
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "off" => Some(Self::Off),
            "color" => Some(Self::Color),
            "breathing" => Some(Self::Breathing),
            "cycle" => Some(Self::Cycle),
            "waves" => Some(Self::Waves),
            "hwave" => Some(Self::HWave),
            "vwave" => Some(Self::VWave),
            "cwave" => Some(Self::CWave),
            "ripple" => Some(Self::Ripple),
            _ => None,
        }
    }
}

/// Which physical part an effect applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NativeEffectPart {
    Keys = 0x00,
    Logo = 0x01,
    All = 0xFF,
}

impl NativeEffectPart {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "keys" => Some(Self::Keys),
            "logo" => Some(Self::Logo),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Whether the effect is also written to the user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum NativeEffectStorage {
    #[default]
    None = 0x00,
    User = 0x01,
}

const LIGHTSYNC_SETUP_FUNCTION: u8 = 0x5C;
const SPEED_BYTE: u8 = 0x64;

/// Color shown on the indicator keys before an effect is applied to all
/// parts, or `None` to leave them alone.
pub fn indicator_color(effect: NativeEffect, color: Color) -> Option<Color> {
    match effect.group() {
        NativeEffectGroup::Color | NativeEffectGroup::Breathing => Some(color),
        NativeEffectGroup::Cycle | NativeEffectGroup::Waves | NativeEffectGroup::Ripple => {
            Some(Color::WHITE)
        }
        NativeEffectGroup::Off => None,
    }
}

/// Frames applying `effect` to `part`, in sending order.
///
/// An empty result means there is nothing to do: the model has no logo
/// and `part` is the logo. [`NativeEffectPart::All`] spans several
/// operations and is sequenced by `KeyboardSession::set_native_effect`.
pub fn encode_effect(
    model: KeyboardModel,
    effect: NativeEffect,
    part: NativeEffectPart,
    period: Duration,
    color: Color,
    storage: NativeEffectStorage,
) -> Result<Vec<Frame>> {
    let p = protocol(model);
    let fx = p.effect;

    match part {
        NativeEffectPart::All => {
            return Err(Error::Unsupported {
                operation: "single-frame effect on all parts",
                model,
            })
        }
        NativeEffectPart::Logo if !fx.has_logo => return Ok(Vec::new()),
        NativeEffectPart::Logo
            if !fx.lightsync && effect.group() == NativeEffectGroup::Waves =>
        {
            // Legacy logos cannot play waves; light them cyan instead.
            return encode_effect(model, NativeEffect::Color, part, Duration::ZERO, Color::CYAN, storage);
        }
        _ => {}
    }

    let ms = u16::try_from(period.as_millis()).unwrap_or(u16::MAX);
    let [hi, lo] = ms.to_be_bytes();
    let mut frame = Frame::long(&[
        LONG_REPORT_ID,
        p.target,
        fx.feature,
        fx.function,
        part as u8,
        effect.group() as u8,
    ]);
    frame.extend(&color.rgb());
    frame.extend(&[hi, lo, hi, lo, effect.variation(), SPEED_BYTE, hi, storage as u8]);

    if !fx.lightsync {
        return Ok(vec![frame]);
    }

    let setup = Frame::long(&[LONG_REPORT_ID, p.target, fx.feature, LIGHTSYNC_SETUP_FUNCTION, 0x01, 0x03, 0x03]);
    frame.set(16, 0x01);
    if part == NativeEffectPart::Keys {
        frame.set(4, 0x01);
        if effect == NativeEffect::Ripple {
            frame.set(9, 0x00);
            frame.set(10, hi);
            frame.set(11, lo);
            frame.set(12, 0x00);
        }
    } else {
        frame.set(4, 0x00);
        let group = match effect {
            NativeEffect::Breathing => 0x03,
            NativeEffect::HWave | NativeEffect::VWave | NativeEffect::CWave => {
                frame.set(13, SPEED_BYTE);
                0x02
            }
            NativeEffect::Waves | NativeEffect::Cycle => 0x02,
            NativeEffect::Ripple | NativeEffect::Off => 0x00,
            NativeEffect::Color => 0x01,
        };
        frame.set(5, group);
    }
    Ok(vec![setup, frame])
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(0xFF, 0x00, 0x00);

    fn padded(prefix: &[u8]) -> Vec<u8> {
        let mut v = prefix.to_vec();
        v.resize(20, 0);
        v
    }

    fn encode(model: KeyboardModel, effect: NativeEffect, part: NativeEffectPart, ms: u64) -> Vec<Frame> {
        encode_effect(model, effect, part, Duration::from_millis(ms), RED, NativeEffectStorage::None).unwrap()
    }

    #[test]
    fn effect_codes() {
        assert_eq!(NativeEffect::CWave.group(), NativeEffectGroup::Waves);
        assert_eq!(NativeEffect::CWave.variation(), 0x03);
        assert_eq!(NativeEffect::Ripple.group(), NativeEffectGroup::Ripple);
        assert_eq!(NativeEffect::Off.group(), NativeEffectGroup::Off);
        assert_eq!(NativeEffect::from_name("HWave"), Some(NativeEffect::HWave));
        assert_eq!(NativeEffectPart::from_name("all"), Some(NativeEffectPart::All));
    }

    #[test]
    fn legacy_breathing_on_keys() {
        let frames = encode(KeyboardModel::G810, NativeEffect::Breathing, NativeEffectPart::Keys, 0x1234);
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0].as_bytes(),
            padded(&[
                0x11, 0xFF, 0x0D, 0x3C, 0x00, 0x02, 0xFF, 0x00, 0x00, 0x12, 0x34, 0x12, 0x34, 0x00, 0x64,
                0x12, 0x00
            ])
        );
    }

    #[test]
    fn storage_byte_is_written() {
        let frames = encode_effect(
            KeyboardModel::G213,
            NativeEffect::Color,
            NativeEffectPart::Keys,
            Duration::ZERO,
            RED,
            NativeEffectStorage::User,
        )
        .unwrap();
        assert_eq!(&frames[0].as_bytes()[..4], &[0x11, 0xFF, 0x0C, 0x3C]);
        assert_eq!(frames[0].as_bytes()[16], 0x01);
    }

    #[test]
    fn logo_without_logo_is_a_no_op() {
        assert!(encode(KeyboardModel::G213, NativeEffect::Color, NativeEffectPart::Logo, 0).is_empty());
        assert!(encode(KeyboardModel::G413, NativeEffect::Waves, NativeEffectPart::Logo, 0).is_empty());
    }

    #[test]
    fn legacy_waves_logo_becomes_cyan_color() {
        let frames = encode(KeyboardModel::G810, NativeEffect::HWave, NativeEffectPart::Logo, 5000);
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0].as_bytes(),
            padded(&[
                0x11, 0xFF, 0x0D, 0x3C, 0x01, 0x01, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x64
            ])
        );
    }

    #[test]
    fn lightsync_keys_ripple() {
        let frames = encode(KeyboardModel::G815, NativeEffect::Ripple, NativeEffectPart::Keys, 0x0A00);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_bytes(), padded(&[0x11, 0xFF, 0x0F, 0x5C, 0x01, 0x03, 0x03]));
        assert_eq!(
            frames[1].as_bytes(),
            padded(&[
                0x11, 0xFF, 0x0F, 0x1C, 0x01, 0x05, 0xFF, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x64,
                0x0A, 0x01
            ])
        );
    }

    #[test]
    fn lightsync_logo_cwave() {
        let frames = encode(KeyboardModel::G915, NativeEffect::CWave, NativeEffectPart::Logo, 0x0100);
        assert_eq!(frames[0].as_bytes(), padded(&[0x11, 0x01, 0x0A, 0x5C, 0x01, 0x03, 0x03]));
        let bytes = frames[1].as_bytes();
        assert_eq!(&bytes[..6], &[0x11, 0x01, 0x0A, 0x1C, 0x00, 0x02]);
        assert_eq!(bytes[13], 0x64);
        assert_eq!(bytes[16], 0x01);
    }

    #[test]
    fn lightsync_logo_groups() {
        let group = |effect| encode(KeyboardModel::G815, effect, NativeEffectPart::Logo, 0)[1].as_bytes()[5];
        assert_eq!(group(NativeEffect::Breathing), 0x03);
        assert_eq!(group(NativeEffect::Cycle), 0x02);
        assert_eq!(group(NativeEffect::Waves), 0x02);
        assert_eq!(group(NativeEffect::Ripple), 0x00);
        assert_eq!(group(NativeEffect::Off), 0x00);
        assert_eq!(group(NativeEffect::Color), 0x01);
    }

    #[test]
    fn all_parts_is_rejected_by_the_frame_encoder() {
        let err = encode_effect(
            KeyboardModel::G810,
            NativeEffect::Color,
            NativeEffectPart::All,
            Duration::ZERO,
            RED,
            NativeEffectStorage::None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
    }

    #[test]
    fn period_saturates() {
        let frames = encode(KeyboardModel::G810, NativeEffect::Cycle, NativeEffectPart::Keys, 100_000);
        assert_eq!(&frames[0].as_bytes()[9..11], &[0xFF, 0xFF]);
    }

    #[test]
    fn indicator_colors() {
        assert_eq!(indicator_color(NativeEffect::Breathing, RED), Some(RED));
        assert_eq!(indicator_color(NativeEffect::Ripple, RED), Some(Color::WHITE));
        assert_eq!(indicator_color(NativeEffect::VWave, RED), Some(Color::WHITE));
        assert_eq!(indicator_color(NativeEffect::Off, RED), None);
    }
}
