//! Per-key lighting frames and the commit frame.
//!
//! Two layouts exist:
//!
//! Group-addressed boards take one frame per address group. After the
//! 8-byte group header, each entry is `offset r g b`; a group with more
//! entries than fit is split across several frames with the same header.
//!
//! Color-batched (LIGHTSYNC) boards take one 20-byte frame per color:
//! `11 tgt feat 6c r g b` followed by up to 13 key offsets and, when the
//! frame is not full, a single `ff` terminator.

use crate::addressing::{group_slot, partition, protocol_offset};
use crate::device::KeyboardModel;
use crate::error::{Error, Result};
use crate::keys::{Color, KeyAddressGroup, KeyColor, KeyGroup};
use crate::protocol::{protocol, KeyEncoding};
use crate::report::{Frame, LONG_REPORT_ID};
use std::collections::BTreeMap;

/// Keys listed in one color-batched frame.
pub const MAX_KEYS_PER_COLOR: usize = 13;

const BATCH_FUNCTION: u8 = 0x6C;
const BATCH_TERMINATOR: u8 = 0xFF;

/// Encode a batch of key colors into the frames `model` expects.
///
/// Keys the model cannot address are dropped. Zoned boards produce no
/// frames at all.
pub fn encode_keys(model: KeyboardModel, assignments: &[KeyColor]) -> Result<Vec<Frame>> {
    if assignments.is_empty() {
        return Err(Error::EmptyRequest);
    }
    let p = protocol(model);
    Ok(match p.keys {
        KeyEncoding::Zoned => Vec::new(),
        KeyEncoding::GroupAddressed(_) => encode_group_addressed(model, assignments),
        KeyEncoding::ColorBatched { feature } => {
            encode_color_batched(model, p.target, feature, assignments)
        }
    })
}

fn encode_group_addressed(model: KeyboardModel, assignments: &[KeyColor]) -> Vec<Frame> {
    let groups = partition(model, assignments);
    let mut frames = Vec::new();
    for group in KeyAddressGroup::ALL {
        let Some(slot) = group_slot(model, group) else {
            continue;
        };
        for chunk in groups[group.index()].chunks(slot.entries_per_frame()) {
            let mut frame = Frame::new(&slot.header, slot.frame_len);
            for kc in chunk {
                frame.push(kc.key.offset());
                frame.extend(&kc.color.rgb());
            }
            frames.push(frame);
        }
    }
    frames
}

fn encode_color_batched(
    model: KeyboardModel,
    target: u8,
    feature: u8,
    assignments: &[KeyColor],
) -> Vec<Frame> {
    // Ordered by packed color so output is deterministic.
    let mut by_color: BTreeMap<u32, (Color, Vec<KeyColor>)> = BTreeMap::new();
    for kc in assignments {
        by_color
            .entry(kc.color.batch_key())
            .or_insert_with(|| (kc.color, Vec::new()))
            .1
            .push(*kc);
    }

    let mut frames = Vec::new();
    for (color, keys) in by_color.values() {
        for chunk in keys.chunks(MAX_KEYS_PER_COLOR) {
            let mut frame = Frame::long(&[LONG_REPORT_ID, target, feature, BATCH_FUNCTION]);
            frame.extend(&color.rgb());
            for offset in chunk.iter().filter_map(|kc| protocol_offset(model, kc.key)) {
                frame.push(offset);
            }
            if frame.remaining() > 0 {
                frame.push(BATCH_TERMINATOR);
            }
            frames.push(frame);
        }
    }
    frames
}

/// Commit frame, or `None` for boards that apply changes immediately.
pub fn encode_commit(model: KeyboardModel) -> Option<Frame> {
    let p = protocol(model);
    p.commit
        .map(|cmd| Frame::long(&[LONG_REPORT_ID, p.target, cmd.feature, cmd.function]))
}

/// Every key of every named group set to `color`, in group order.
pub fn all_key_assignments(color: Color) -> Vec<KeyColor> {
    KeyGroup::ALL
        .iter()
        .flat_map(|group| group.keys())
        .map(|&key| KeyColor::new(key, color))
        .collect()
}
