//! Per-model protocol constants.
//!
//! Everything that varies between keyboard models lives in one
//! [`ModelProtocol`] record per model. The encoders in `encoder` and
//! `effects` read these records and never branch on the model directly.
//!
//! Frame headers use the HID++ 2.0 shape: report ID, target (device
//! index, 0xFF for wired boards, 0x01 behind the G915 receiver), feature
//! index, function/software byte.

use crate::device::KeyboardModel;
use crate::keys::{Key, KeyAddressGroup};
use crate::report::{LONG_REPORT_LEN, VERY_LONG_REPORT_LEN};

/// Device index of wired keyboards.
pub const TARGET_WIRED: u8 = 0xFF;
/// Device index of the G915 behind its receiver.
pub const TARGET_RECEIVER: u8 = 0x01;

/// How per-key color requests are laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEncoding {
    /// Whole-zone lighting only; no per-key addressing.
    Zoned,
    /// One frame per address group, each entry carrying its own color.
    GroupAddressed(&'static GroupTable),
    /// One frame per distinct color listing up to 13 keys.
    ColorBatched { feature: u8 },
}

/// How `setAllKeys` is realised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllKeysStrategy {
    /// Set every lighting region in turn.
    Regions,
    /// Apply the native static-color effect to the keys.
    NativeColor,
    /// Assign every named key group and send per-key frames.
    PerKey,
    /// No all-keys mapping.
    Unsupported,
}

/// Which keys of an address group a model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFilter {
    Any,
    Only(Key),
    /// Tenkeyless boards: the numeric keypad block does not exist.
    ExcludeNumpad,
}

impl KeyFilter {
    pub fn accepts(self, key: Key) -> bool {
        match self {
            Self::Any => true,
            Self::Only(only) => key == only,
            Self::ExcludeNumpad => !key.is_numpad(),
        }
    }
}

/// Addressing of one address group on a group-addressed model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSlot {
    /// Report ID, target, feature, function, base offset, stride, capacity.
    pub header: [u8; 8],
    pub frame_len: usize,
    /// Maximum number of entries kept per request; the rest are dropped.
    pub capacity: usize,
    pub filter: KeyFilter,
}

impl GroupSlot {
    /// Entries that fit in one frame after the 8-byte header.
    pub fn entries_per_frame(&self) -> usize {
        (self.frame_len - 8) / 4
    }
}

/// Group slots of a group-addressed model, indexed by address group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupTable {
    pub logo: Option<GroupSlot>,
    pub indicators: Option<GroupSlot>,
    pub multimedia: Option<GroupSlot>,
    pub gkeys: Option<GroupSlot>,
    pub keys: Option<GroupSlot>,
}

impl GroupTable {
    pub fn slot(&self, group: KeyAddressGroup) -> Option<&GroupSlot> {
        match group {
            KeyAddressGroup::Logo => self.logo.as_ref(),
            KeyAddressGroup::Indicators => self.indicators.as_ref(),
            KeyAddressGroup::Multimedia => self.multimedia.as_ref(),
            KeyAddressGroup::GKeys => self.gkeys.as_ref(),
            KeyAddressGroup::Keys => self.keys.as_ref(),
        }
    }
}

/// Accepted values of a mode toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeValues {
    /// Value sent as-is.
    Range { min: u8, max: u8 },
    /// Values 1..=max sent as a single bit, `1 << (value - 1)`.
    OneHot { max: u8 },
}

/// A single-byte setting written with one fixed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeToggle {
    pub feature: u8,
    pub function: u8,
    pub values: ModeValues,
}

/// Feature/function pair of a fixed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub feature: u8,
    pub function: u8,
}

/// Native effect addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectProtocol {
    pub feature: u8,
    pub function: u8,
    pub has_logo: bool,
    /// LIGHTSYNC boards need a setup frame and use a different part/byte layout.
    pub lightsync: bool,
}

/// Everything the encoders need to know about one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelProtocol {
    pub target: u8,
    pub keys: KeyEncoding,
    pub all_keys: AllKeysStrategy,
    /// `None` for non-transactional boards.
    pub commit: Option<Command>,
    pub region: Option<ModeToggle>,
    pub startup: Option<Command>,
    pub onboard: Option<Command>,
    pub mr: Option<ModeToggle>,
    pub mn: Option<ModeToggle>,
    pub gkeys: Option<ModeToggle>,
    pub effect: EffectProtocol,
    pub usb_interface: u8,
    pub interrupt_endpoint: u8,
}

const fn slot(header: [u8; 8], frame_len: usize, capacity: usize, filter: KeyFilter) -> Option<GroupSlot> {
    Some(GroupSlot {
        header,
        frame_len,
        capacity,
        filter,
    })
}

const fn cmd(feature: u8, function: u8) -> Option<Command> {
    Some(Command { feature, function })
}

const fn toggle(feature: u8, function: u8, values: ModeValues) -> Option<ModeToggle> {
    Some(ModeToggle {
        feature,
        function,
        values,
    })
}

const BINARY: ModeValues = ModeValues::Range { min: 0, max: 1 };

const LOGO: [u8; 8] = [0x11, 0xFF, 0x0C, 0x3A, 0x00, 0x10, 0x00, 0x01];
const INDICATORS: [u8; 8] = [0x12, 0xFF, 0x0C, 0x3A, 0x00, 0x40, 0x00, 0x05];
const MULTIMEDIA: [u8; 8] = [0x12, 0xFF, 0x0C, 0x3A, 0x00, 0x02, 0x00, 0x05];
const KEYS: [u8; 8] = [0x12, 0xFF, 0x0C, 0x3A, 0x00, 0x01, 0x00, 0x0E];
const G910_LOGO: [u8; 8] = [0x11, 0xFF, 0x0F, 0x3A, 0x00, 0x10, 0x00, 0x02];
const G910_GKEYS: [u8; 8] = [0x12, 0xFF, 0x0F, 0x3E, 0x00, 0x04, 0x00, 0x09];
const G910_KEYS: [u8; 8] = [0x12, 0xFF, 0x0F, 0x3D, 0x00, 0x01, 0x00, 0x0E];

const LONG: usize = LONG_REPORT_LEN;
const VLONG: usize = VERY_LONG_REPORT_LEN;

const INDICATOR_SLOT: Option<GroupSlot> = slot(INDICATORS, VLONG, 6, KeyFilter::Any);
const KEYS_SLOT: Option<GroupSlot> = slot(KEYS, VLONG, 121, KeyFilter::Any);

const G410_GROUPS: GroupTable = GroupTable {
    logo: slot(LOGO, LONG, 0, KeyFilter::Any),
    indicators: INDICATOR_SLOT,
    multimedia: None,
    gkeys: None,
    keys: slot(KEYS, VLONG, 121, KeyFilter::ExcludeNumpad),
};

const G51X_GROUPS: GroupTable = GroupTable {
    logo: slot(LOGO, LONG, 0, KeyFilter::Any),
    indicators: INDICATOR_SLOT,
    multimedia: None,
    gkeys: None,
    keys: KEYS_SLOT,
};

const GPRO_GROUPS: GroupTable = GroupTable {
    logo: slot(LOGO, LONG, 2, KeyFilter::Only(Key::Logo)),
    indicators: INDICATOR_SLOT,
    multimedia: None,
    gkeys: None,
    keys: KEYS_SLOT,
};

const G810_GROUPS: GroupTable = GroupTable {
    logo: slot(LOGO, LONG, 2, KeyFilter::Only(Key::Logo)),
    indicators: INDICATOR_SLOT,
    multimedia: slot(MULTIMEDIA, VLONG, 6, KeyFilter::Any),
    gkeys: None,
    keys: KEYS_SLOT,
};

const G910_GROUPS: GroupTable = GroupTable {
    logo: slot(G910_LOGO, LONG, 3, KeyFilter::Any),
    indicators: INDICATOR_SLOT,
    multimedia: None,
    gkeys: slot(G910_GKEYS, VLONG, 10, KeyFilter::Any),
    keys: slot(G910_KEYS, VLONG, 121, KeyFilter::Any),
};

const LEGACY_EFFECT: EffectProtocol = EffectProtocol {
    feature: 0x0D,
    function: 0x3C,
    has_logo: true,
    lightsync: false,
};

const ZONED_EFFECT: EffectProtocol = EffectProtocol {
    feature: 0x0C,
    function: 0x3C,
    has_logo: false,
    lightsync: false,
};

/// Shared shape of the wired per-key boards (G410/G512/G513/G610/G810/G Pro).
const fn per_key(groups: &'static GroupTable, startup: bool) -> ModelProtocol {
    ModelProtocol {
        target: TARGET_WIRED,
        keys: KeyEncoding::GroupAddressed(groups),
        all_keys: AllKeysStrategy::PerKey,
        commit: cmd(0x0C, 0x5A),
        region: None,
        startup: if startup { cmd(0x0D, 0x5A) } else { None },
        onboard: None,
        mr: None,
        mn: None,
        gkeys: None,
        effect: LEGACY_EFFECT,
        usb_interface: 1,
        interrupt_endpoint: 0x82,
    }
}

const G213: ModelProtocol = ModelProtocol {
    target: TARGET_WIRED,
    keys: KeyEncoding::Zoned,
    all_keys: AllKeysStrategy::Regions,
    commit: None,
    region: toggle(0x0C, 0x3A, ModeValues::Range { min: 1, max: 5 }),
    startup: cmd(0x0D, 0x5A),
    onboard: None,
    mr: None,
    mn: None,
    gkeys: None,
    effect: ZONED_EFFECT,
    usb_interface: 1,
    interrupt_endpoint: 0x82,
};

const G413: ModelProtocol = ModelProtocol {
    all_keys: AllKeysStrategy::NativeColor,
    region: None,
    startup: None,
    ..G213
};

const G410: ModelProtocol = per_key(&G410_GROUPS, true);
const G51X: ModelProtocol = per_key(&G51X_GROUPS, false);
const G810: ModelProtocol = per_key(&G810_GROUPS, true);
const GPRO: ModelProtocol = per_key(&GPRO_GROUPS, true);

const G910: ModelProtocol = ModelProtocol {
    keys: KeyEncoding::GroupAddressed(&G910_GROUPS),
    commit: cmd(0x0F, 0x5D),
    startup: cmd(0x10, 0x5E),
    mr: toggle(0x0A, 0x0E, BINARY),
    mn: toggle(0x09, 0x1E, ModeValues::Range { min: 0, max: 7 }),
    gkeys: toggle(0x08, 0x2E, BINARY),
    effect: EffectProtocol {
        feature: 0x10,
        ..LEGACY_EFFECT
    },
    ..per_key(&G910_GROUPS, true)
};

const G815: ModelProtocol = ModelProtocol {
    target: TARGET_WIRED,
    keys: KeyEncoding::ColorBatched { feature: 0x10 },
    all_keys: AllKeysStrategy::PerKey,
    commit: cmd(0x10, 0x7F),
    region: None,
    startup: None,
    onboard: cmd(0x11, 0x1A),
    mr: toggle(0x0C, 0x0C, BINARY),
    mn: toggle(0x0B, 0x1C, ModeValues::OneHot { max: 3 }),
    gkeys: toggle(0x0A, 0x2B, BINARY),
    effect: EffectProtocol {
        feature: 0x0F,
        function: 0x1C,
        has_logo: true,
        lightsync: true,
    },
    usb_interface: 1,
    interrupt_endpoint: 0x82,
};

const G915: ModelProtocol = ModelProtocol {
    target: TARGET_RECEIVER,
    keys: KeyEncoding::ColorBatched { feature: 0x0B },
    all_keys: AllKeysStrategy::Unsupported,
    commit: cmd(0x0B, 0x7F),
    onboard: cmd(0x15, 0x1A),
    mr: toggle(0x13, 0x0C, BINARY),
    mn: toggle(0x12, 0x1C, ModeValues::OneHot { max: 3 }),
    gkeys: toggle(0x11, 0x2B, BINARY),
    effect: EffectProtocol {
        feature: 0x0A,
        ..G815.effect
    },
    usb_interface: 2,
    interrupt_endpoint: 0x83,
    ..G815
};

/// Protocol record of a model.
pub fn protocol(model: KeyboardModel) -> &'static ModelProtocol {
    match model {
        KeyboardModel::G213 => &G213,
        KeyboardModel::G410 => &G410,
        KeyboardModel::G413 => &G413,
        KeyboardModel::G512 | KeyboardModel::G513 => &G51X,
        KeyboardModel::G610 | KeyboardModel::G810 => &G810,
        KeyboardModel::G815 => &G815,
        KeyboardModel::G910 => &G910,
        KeyboardModel::G915 => &G915,
        KeyboardModel::GPro => &GPRO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_g915_sits_behind_the_receiver() {
        for model in KeyboardModel::ALL {
            let p = protocol(*model);
            if *model == KeyboardModel::G915 {
                assert_eq!(p.target, TARGET_RECEIVER);
                assert_eq!((p.usb_interface, p.interrupt_endpoint), (2, 0x83));
            } else {
                assert_eq!(p.target, TARGET_WIRED);
                assert_eq!((p.usb_interface, p.interrupt_endpoint), (1, 0x82));
            }
        }
    }

    #[test]
    fn group_headers_carry_their_frame_length() {
        for model in KeyboardModel::ALL {
            if let KeyEncoding::GroupAddressed(table) = protocol(*model).keys {
                for group in KeyAddressGroup::ALL {
                    if let Some(slot) = table.slot(group) {
                        let expected = if slot.header[0] == 0x11 { LONG } else { VLONG };
                        assert_eq!(slot.frame_len, expected, "{model:?} {group:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn entries_per_frame_follow_frame_length() {
        assert_eq!(G810_GROUPS.logo.unwrap().entries_per_frame(), 3);
        assert_eq!(G810_GROUPS.keys.unwrap().entries_per_frame(), 14);
    }

    #[test]
    fn g413_shares_g213_effect_bytes() {
        assert_eq!(G413.effect, G213.effect);
        assert!(!G413.effect.has_logo);
        assert!(G413.commit.is_none());
    }

    #[test]
    fn g915_reuses_lightsync_layout_with_own_indices() {
        assert!(G915.effect.lightsync);
        assert_eq!(G915.effect.feature, 0x0A);
        assert_eq!(G915.effect.function, 0x1C);
        assert_eq!(G915.keys, KeyEncoding::ColorBatched { feature: 0x0B });
    }

    #[test]
    fn key_filter() {
        assert!(KeyFilter::Any.accepts(Key::Logo2));
        assert!(KeyFilter::Only(Key::Logo).accepts(Key::Logo));
        assert!(!KeyFilter::Only(Key::Logo).accepts(Key::Logo2));
        assert!(!KeyFilter::ExcludeNumpad.accepts(Key::Num5));
        assert!(KeyFilter::ExcludeNumpad.accepts(Key::A));
    }
}
