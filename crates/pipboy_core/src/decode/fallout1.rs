use log::{debug, warn};

use super::{Capture, RawSave, section};
use crate::error::FormatError;
use crate::layout::SectionId;
use crate::object::GameObject;
use crate::reader::BigEndianReader;
use crate::sections::{
    CritterProto, PcStats, SaveHeader, is_save_map_name, parse_combat_state, parse_map_file_list,
    parse_tagged_skills, parse_traits, skip_event_queue,
};
use crate::tables::fallout1::{KILL_TYPE_COUNT, PERK_COUNT};

const GLOBAL_VAR_PROBE: std::ops::Range<usize> = 100..2000;
const GLOBALS_CONFIDENCE: f32 = 0.75;
const PROBED_ITEMS_CONFIDENCE: f32 = 0.9;
const TRAIT_FALLBACK_CONFIDENCE: f32 = 0.5;

pub(super) fn decode_handlers<'a>(
    r: &mut BigEndianReader<'a>,
    capture: &mut Capture<'_>,
    header: SaveHeader,
) -> Result<RawSave, FormatError> {
    let player_combat_id = section(r, capture, SectionId::Handler(1), 1.0, |r| r.read_i32())?;

    // Globals are N i32s plus a one-byte movie flag; N is not stored.
    let global_var_count = section(r, capture, SectionId::Handler(2), GLOBALS_CONFIDENCE, |r| {
        let n = detect_global_var_count(r)?;
        r.skip(n * 4 + 1)?;
        Ok(n)
    })?;
    debug!("fallout 1: detected {global_var_count} global variables");

    let maps = section(r, capture, SectionId::Handler(3), 1.0, |r| {
        parse_map_file_list(r, false)
    })?;
    section(r, capture, SectionId::Handler(4), 1.0, |r| {
        r.skip(global_var_count * 4 + 1)
    })?;

    let (player, center_tile) = section(r, capture, SectionId::Handler(5), 1.0, |r| {
        let player = GameObject::parse(r)?;
        Ok((player, r.read_i32()?))
    })?;
    if player.probed_item_count() > 0 {
        capture.lower_confidence(SectionId::Handler(5), PROBED_ITEMS_CONFIDENCE);
    }

    let proto = section(r, capture, SectionId::Handler(6), 1.0, CritterProto::parse)?;
    let kill_counts = section(r, capture, SectionId::Handler(7), 1.0, |r| {
        r.read_i32_vec(KILL_TYPE_COUNT)
    })?;
    let tagged_skills = section(r, capture, SectionId::Handler(8), 1.0, parse_tagged_skills)?;
    section(r, capture, SectionId::Handler(9), 1.0, |_| Ok(()))?;
    let perks = section(r, capture, SectionId::Handler(10), 1.0, |r| {
        r.read_i32_vec(PERK_COUNT)
    })?;
    let combat = section(r, capture, SectionId::Handler(11), 1.0, |r| {
        parse_combat_state(r, false)
    })?;
    section(r, capture, SectionId::Handler(12), 1.0, |_| Ok(()))?;
    let pc_stats = section(r, capture, SectionId::Handler(13), 1.0, PcStats::parse)?;

    // Handlers 14-16 are unreliable in saves from some patched builds; the
    // save stays editable without traits if the event queue or the trait
    // words cannot be read. Unknown trait indices are kept as read.
    let before_traits = r.clone();
    let mark = capture.mark();
    let (traits, tail_confidence) = match decode_traits(r, capture) {
        Ok(traits) => (Some(traits), 1.0),
        Err(err) => {
            warn!("fallout 1: trait sections unreadable, keeping them opaque: {err}");
            *r = before_traits;
            capture.truncate(mark);
            (None, TRAIT_FALLBACK_CONFIDENCE)
        }
    };

    Ok(RawSave {
        header,
        player_combat_id,
        global_var_count,
        map_files: maps.map_files,
        automap_size: maps.automap_size,
        player,
        center_tile,
        h5_trailer: Vec::new(),
        proto,
        kill_counts,
        tagged_skills,
        perks,
        combat,
        pc_stats,
        traits,
        party_member_count: None,
        ai_packet_count: None,
        game_difficulty: None,
        tail_confidence,
    })
}

fn decode_traits(
    r: &mut BigEndianReader<'_>,
    capture: &mut Capture<'_>,
) -> Result<[i32; 2], FormatError> {
    section(r, capture, SectionId::Handler(14), 1.0, |_| Ok(()))?;
    let events = section(r, capture, SectionId::Handler(15), 1.0, skip_event_queue)?;
    debug!("fallout 1: skipped {events} queued events");
    section(r, capture, SectionId::Handler(16), 1.0, parse_traits)
}

/// First N whose following map list has 0 < count < 200 and starts with a
/// `.SAV` name.
fn detect_global_var_count(r: &BigEndianReader<'_>) -> Result<usize, FormatError> {
    let start = r.position();
    for n in GLOBAL_VAR_PROBE {
        let mut probe = r.clone();
        if probe.seek_to(start + n * 4 + 1).is_err() {
            break;
        }
        let Ok(count) = probe.read_i32() else {
            break;
        };
        if !(1..200).contains(&count) {
            continue;
        }
        if let Ok(name) = probe.read_null_terminated_string(16)
            && is_save_map_name(&name)
        {
            return Ok(n);
        }
    }

    Err(FormatError::section(
        SectionId::Handler(2),
        "could not detect global variable count",
    ))
}
