//! Key addressing: which frame header a key group uses and which protocol
//! byte a key becomes on a given model.
//!
//! Unsupported (model, key) combinations resolve to `None` and are dropped
//! by the encoders; they never fail a request.

use crate::device::KeyboardModel;
use crate::keys::{Key, KeyAddressGroup, KeyColor};
use crate::protocol::{protocol, GroupSlot, KeyEncoding};

/// Offsets applied by LIGHTSYNC (color-batched) boards per address group.
const LIGHTSYNC_KEYS_OFFSET: u8 = 0x03;
const LIGHTSYNC_MODIFIER_OFFSET: u8 = 0x78;
const LIGHTSYNC_LOGO_BASE: u8 = 0xD1;
const LIGHTSYNC_INDICATOR_BASE: u8 = 0x98;
const LIGHTSYNC_GKEY_BASE: u8 = 0xB3;

/// Slot describing how `group` is addressed on `model`, if at all.
pub fn group_slot(model: KeyboardModel, group: KeyAddressGroup) -> Option<&'static GroupSlot> {
    match protocol(model).keys {
        KeyEncoding::GroupAddressed(table) => table.slot(group),
        KeyEncoding::Zoned | KeyEncoding::ColorBatched { .. } => None,
    }
}

/// Fixed leading bytes of a frame addressing `group`, or `None` when the
/// model has no per-key addressing for it.
pub fn group_base_address(model: KeyboardModel, group: KeyAddressGroup) -> Option<[u8; 8]> {
    group_slot(model, group).map(|slot| slot.header)
}

/// Number of entries of `group` kept per request; excess entries are dropped.
pub fn group_capacity(model: KeyboardModel, group: KeyAddressGroup) -> usize {
    group_slot(model, group).map_or(0, |slot| slot.capacity)
}

/// Protocol byte the firmware of `model` expects for `key`.
pub fn protocol_offset(model: KeyboardModel, key: Key) -> Option<u8> {
    match protocol(model).keys {
        KeyEncoding::Zoned => None,
        KeyEncoding::GroupAddressed(table) => {
            let slot = table.slot(key.group())?;
            (slot.capacity > 0 && slot.filter.accepts(key)).then_some(key.offset())
        }
        KeyEncoding::ColorBatched { .. } => lightsync_offset(key),
    }
}

fn lightsync_offset(key: Key) -> Option<u8> {
    match key {
        Key::Logo2 | Key::Game | Key::Caps | Key::Scroll | Key::Num => None,
        Key::Stop | Key::G6 | Key::G7 | Key::G8 | Key::G9 => None,
        Key::Play => Some(0x9B),
        Key::Mute => Some(0x9C),
        Key::Next => Some(0x9D),
        Key::Prev => Some(0x9E),
        k if k.is_modifier() => Some(k.offset().wrapping_sub(LIGHTSYNC_MODIFIER_OFFSET)),
        k => match k.group() {
            KeyAddressGroup::Logo => Some(k.offset().wrapping_add(LIGHTSYNC_LOGO_BASE)),
            KeyAddressGroup::Indicators => Some(k.offset().wrapping_add(LIGHTSYNC_INDICATOR_BASE)),
            KeyAddressGroup::GKeys => Some(k.offset().wrapping_add(LIGHTSYNC_GKEY_BASE)),
            KeyAddressGroup::Keys => Some(k.offset().wrapping_sub(LIGHTSYNC_KEYS_OFFSET)),
            KeyAddressGroup::Multimedia => None,
        },
    }
}

/// Split assignments into the five address groups of a group-addressed
/// model, applying each group's key filter and capacity while partitioning.
///
/// The result is indexed by [`KeyAddressGroup::index`]; request order is
/// preserved within each group.
pub fn partition(model: KeyboardModel, assignments: &[KeyColor]) -> [Vec<KeyColor>; 5] {
    let mut groups: [Vec<KeyColor>; 5] = Default::default();
    for kc in assignments {
        let group = kc.key.group();
        let Some(slot) = group_slot(model, group) else {
            continue;
        };
        let bucket = &mut groups[group.index()];
        if bucket.len() < slot.capacity && slot.filter.accepts(kc.key) {
            bucket.push(*kc);
        }
    }
    groups
}
