use log::debug;

use super::{Capture, RawSave, section};
use crate::error::FormatError;
use crate::layout::SectionId;
use crate::object::GameObject;
use crate::reader::BigEndianReader;
use crate::sections::{
    CombatState, CritterProto, MapFileList, PcStats, SaveHeader, is_save_map_name,
    is_trait_value_valid, parse_combat_state, parse_map_file_list, parse_tagged_skills,
    parse_traits,
};
use crate::tables::fallout2::{KILL_TYPE_COUNT, PERK_COUNT};
use crate::tables::{PROTO_LEN, SKILL_COUNT, TAGGED_SKILL_COUNT};

const MAX_GLOBAL_VAR_COUNT: usize = 5000;
const MAX_AUTOMAP_SIZE: i32 = 200_000_000;
const PROTO_SEARCH_WINDOW: usize = 1024;
const PROTO_MIN_SCORE: i32 = 12;
const PROTO_MAX_SCORE: i32 = 32;
const MAX_PARTY_MEMBER_COUNT: usize = 64;
const AI_PACKET_INT_COUNT: usize = 45;
const PREFERENCE_PREFIX_COUNT: usize = 5;
const TRAIT_RANGE_WEIGHT: i32 = 8;

const GLOBALS_CONFIDENCE: f32 = 0.9;
const PROBED_ITEMS_CONFIDENCE: f32 = 0.9;
const JOINT_DETECTION_CONFIDENCE: f32 = 0.8;

pub(super) fn decode_handlers<'a>(
    r: &mut BigEndianReader<'a>,
    capture: &mut Capture<'_>,
    header: SaveHeader,
) -> Result<RawSave, FormatError> {
    let player_combat_id = section(r, capture, SectionId::Handler(1), 1.0, |r| r.read_i32())?;

    let (global_var_count, maps) = detect_globals(r)?;
    debug!("fallout 2: detected {global_var_count} global variables");
    section(r, capture, SectionId::Handler(2), GLOBALS_CONFIDENCE, |r| {
        r.skip(global_var_count * 4)
    })?;
    section(r, capture, SectionId::Handler(3), 1.0, |r| {
        parse_map_file_list(r, true).map(|_| ())
    })?;
    section(r, capture, SectionId::Handler(4), 1.0, |r| {
        r.skip(global_var_count * 4)
    })?;

    // The player object's inventory cannot always be walked exactly without
    // proto files, so the critter proto after it is located by search and
    // any bytes in between stay with handler 5.
    let h5_start = r.position();
    let player = GameObject::parse(r).map_err(|e| e.in_section(SectionId::Handler(5)))?;
    let center_tile = r
        .read_i32()
        .map_err(|e| e.in_section(SectionId::Handler(5)))?;
    let object_end = r.position();
    let (proto_pos, proto_score) = locate_critter_proto(r)?;
    let h5_trailer = r.clone().read_bytes(proto_pos - object_end).map(<[u8]>::to_vec)?;
    debug!(
        "fallout 2: critter proto at offset {proto_pos} (+{}) scored {proto_score}/{PROTO_MAX_SCORE}",
        proto_pos - object_end
    );

    let h5_confidence = if proto_pos != object_end || player.probed_item_count() > 0 {
        PROBED_ITEMS_CONFIDENCE
    } else {
        1.0
    };
    capture.record(SectionId::Handler(5), h5_start, proto_pos, h5_confidence);
    r.seek_to(proto_pos)?;

    let proto_confidence = proto_score as f32 / PROTO_MAX_SCORE as f32;
    let proto = section(
        r,
        capture,
        SectionId::Handler(6),
        proto_confidence,
        CritterProto::parse,
    )?;
    let kill_counts = section(r, capture, SectionId::Handler(7), 1.0, |r| {
        r.read_i32_vec(KILL_TYPE_COUNT)
    })?;
    let tagged_skills = section(r, capture, SectionId::Handler(8), 1.0, parse_tagged_skills)?;
    section(r, capture, SectionId::Handler(9), 1.0, |_| Ok(()))?;

    let post = detect_post_tagged(r)?;
    debug!(
        "fallout 2: {} party members, {} ai packets (score {})",
        post.party_member_count, post.ai_packet_count, post.score
    );

    let perks = section(r, capture, SectionId::Handler(10), JOINT_DETECTION_CONFIDENCE, |r| {
        let perks = r.read_i32_vec(PERK_COUNT)?;
        r.skip((post.party_member_count - 1) * PERK_COUNT * 4)?;
        Ok(perks)
    })?;
    let combat = section(r, capture, SectionId::Handler(11), JOINT_DETECTION_CONFIDENCE, |r| {
        parse_combat_state(r, true)
    })?;
    section(r, capture, SectionId::Handler(12), JOINT_DETECTION_CONFIDENCE, |r| {
        r.skip(post.ai_packet_count * AI_PACKET_INT_COUNT * 4)
    })?;
    let pc_stats = section(
        r,
        capture,
        SectionId::Handler(13),
        JOINT_DETECTION_CONFIDENCE,
        PcStats::parse,
    )?;
    section(r, capture, SectionId::Handler(14), 1.0, |_| Ok(()))?;
    let traits = section(r, capture, SectionId::Handler(15), 1.0, parse_traits)?;
    section(r, capture, SectionId::Handler(16), 1.0, |r| r.read_i32())?;
    let preferences = section(r, capture, SectionId::Handler(17), 1.0, |r| {
        r.read_i32_array::<PREFERENCE_PREFIX_COUNT>()
    })?;

    Ok(RawSave {
        header,
        player_combat_id,
        global_var_count,
        map_files: maps.map_files,
        automap_size: maps.automap_size,
        player,
        center_tile,
        h5_trailer,
        proto,
        kill_counts,
        tagged_skills,
        perks,
        combat,
        pc_stats,
        traits: Some(traits),
        party_member_count: Some(post.party_member_count),
        ai_packet_count: Some(post.ai_packet_count),
        game_difficulty: Some(preferences[0]),
        tail_confidence: 1.0,
    })
}

/// First N for which the map list parses strictly, names only `.SAV` maps,
/// has a sane automap size, and is followed by an exact copy of the N
/// globals.
fn detect_globals(r: &BigEndianReader<'_>) -> Result<(usize, MapFileList), FormatError> {
    let start = r.position();
    for n in 1..MAX_GLOBAL_VAR_COUNT {
        let mut probe = r.clone();
        let Ok(globals) = probe.read_bytes(n * 4) else {
            break;
        };
        let Ok(maps) = parse_map_file_list(&mut probe, true) else {
            continue;
        };
        if !maps.map_files.iter().all(|name| is_save_map_name(name)) {
            continue;
        }
        if !(0..=MAX_AUTOMAP_SIZE).contains(&maps.automap_size) {
            continue;
        }
        match probe.read_bytes(n * 4) {
            Ok(copy) if copy == globals => return Ok((n, maps)),
            _ => continue,
        }
    }

    Err(FormatError::section(
        SectionId::Handler(2),
        format!("could not detect global variable count after offset {start}"),
    ))
}

/// Scans forward in 4-byte steps for the offset whose proto, kill counts
/// and tags look most plausible. Ties keep the nearest offset.
fn locate_critter_proto(r: &BigEndianReader<'_>) -> Result<(usize, i32), FormatError> {
    let origin = r.position();
    let mut best: Option<(usize, i32)> = None;

    for delta in (0..=PROTO_SEARCH_WINDOW).step_by(4) {
        let pos = origin + delta;
        if pos + PROTO_LEN > r.len() {
            break;
        }
        let mut probe = r.clone();
        if probe.seek_to(pos).is_err() {
            break;
        }
        let Ok(proto) = CritterProto::parse(&mut probe) else {
            continue;
        };
        let Ok(kills) = probe.read_i32_vec(KILL_TYPE_COUNT) else {
            continue;
        };
        let Ok(tags) = parse_tagged_skills(&mut probe) else {
            continue;
        };

        let score = score_critter_proto(&proto, &kills, &tags);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((pos, score));
        }
    }

    match best {
        Some((pos, score)) if score >= PROTO_MIN_SCORE => Ok((pos, score)),
        _ => Err(FormatError::section(
            SectionId::Handler(6),
            "could not align critter proto section",
        )),
    }
}

fn score_critter_proto(proto: &CritterProto, kills: &[i32], tags: &[i32; TAGGED_SKILL_COUNT]) -> i32 {
    let mut score = 0;

    if proto.base_stats.iter().take(7).all(|v| (1..=10).contains(v)) {
        score += 12;
    }
    if proto.skills.iter().all(|v| (0..=400).contains(v)) {
        score += 6;
    }
    if (0..=100_000_000).contains(&proto.experience) {
        score += 2;
    }
    if (0..=64).contains(&proto.body_type) {
        score += 1;
    }
    if kills.iter().all(|v| (0..=1_000_000).contains(v)) {
        score += 3;
    }
    if tags
        .iter()
        .all(|&skill| skill == -1 || (0..SKILL_COUNT as i32).contains(&skill))
    {
        score += 4;
    }

    let mut set: Vec<i32> = tags.iter().copied().filter(|&v| v >= 0).collect();
    if !set.is_empty() {
        score += 2;
    }
    let tagged = set.len();
    set.sort_unstable();
    set.dedup();
    if set.len() == tagged {
        score += 2;
    }

    score
}

struct PostTagged {
    party_member_count: usize,
    ai_packet_count: usize,
    score: i32,
}

struct PostPc {
    traits: [i32; 2],
    game_difficulty: i32,
}

/// Handlers 10-13 carry party perks and AI packets whose counts are not
/// stored. Every (P, A) pair is tried; the best-scoring one wins and ties
/// keep the smaller P, then the smaller A.
fn detect_post_tagged(r: &BigEndianReader<'_>) -> Result<PostTagged, FormatError> {
    let mut best: Option<PostTagged> = None;

    for party_member_count in 1..=MAX_PARTY_MEMBER_COUNT {
        let mut probe = r.clone();
        let Ok(perks) = probe.read_i32_vec(PERK_COUNT) else {
            break;
        };
        if probe.skip((party_member_count - 1) * PERK_COUNT * 4).is_err() {
            break;
        }
        let Ok(combat) = parse_combat_state(&mut probe, true) else {
            continue;
        };
        let after_combat = probe.position();

        for ai_packet_count in 0..=party_member_count {
            let mut tail = probe.clone();
            if tail
                .seek_to(after_combat + ai_packet_count * AI_PACKET_INT_COUNT * 4)
                .is_err()
            {
                break;
            }
            let Ok(pc_stats) = PcStats::parse(&mut tail) else {
                break;
            };
            let Ok(post_pc) = parse_post_pc(&mut tail) else {
                continue;
            };
            let Some(score) = score_post_tagged(
                &perks,
                &combat,
                &pc_stats,
                &post_pc,
                party_member_count,
                ai_packet_count,
            ) else {
                continue;
            };

            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(PostTagged {
                    party_member_count,
                    ai_packet_count,
                    score,
                });
            }
        }
    }

    best.ok_or_else(|| {
        FormatError::section(
            SectionId::Handler(10),
            "could not detect party member and ai packet counts",
        )
    })
}

fn parse_post_pc(r: &mut BigEndianReader<'_>) -> Result<PostPc, FormatError> {
    let traits = parse_traits(r)?;
    let _automap_flags = r.read_i32()?;
    let preferences = r.read_i32_array::<PREFERENCE_PREFIX_COUNT>()?;
    Ok(PostPc {
        traits,
        game_difficulty: preferences[0],
    })
}

fn score_post_tagged(
    perks: &[i32],
    combat: &CombatState,
    pc_stats: &PcStats,
    post_pc: &PostPc,
    party_member_count: usize,
    ai_packet_count: usize,
) -> Option<i32> {
    let plausible = perks.iter().all(|rank| (-1..=20).contains(rank))
        && (1..=99).contains(&pc_stats.level)
        && (0..=100_000_000).contains(&pc_stats.experience)
        && (-10_000..=10_000).contains(&pc_stats.reputation)
        && (-100_000..=100_000).contains(&pc_stats.karma);
    if !plausible {
        return None;
    }

    let mut score = 50;
    score -= party_member_count as i32 / 4;
    score -= ai_packet_count as i32 / 2;

    if ai_packet_count <= party_member_count {
        score += 4;
    }
    if !combat.in_combat() {
        score += 2;
    }
    if combat.flags == 0x02 {
        score += 2;
    }
    if pc_stats.unspent_skill_points <= 10_000 {
        score += 2;
    }
    if perks.iter().all(|&rank| rank >= 0) {
        score += 1;
    }
    if (0..=2).contains(&post_pc.game_difficulty) {
        score += 2;
    }
    // Out-of-range traits lower the score but never rule a candidate out.
    if post_pc.traits.iter().all(|&v| is_trait_value_valid(v)) {
        score += TRAIT_RANGE_WEIGHT;
    }
    if post_pc.traits.contains(&-1) {
        score += 1;
    }

    Some(score)
}
