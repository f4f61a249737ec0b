//! Record types for the fixed-shape handlers and the parsers both game
//! variants share. Variant-specific walking lives in the decoder.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::layout::SectionId;
use crate::reader::BigEndianReader;
use crate::tables::{
    HEADER_PADDING, PC_STAT_COUNT, PREVIEW_SIZE, RELEASE_MARKER, SAVEABLE_STAT_COUNT, SIGNATURE,
    SKILL_COUNT, TAGGED_SKILL_COUNT, TRAIT_NAMES, TRAIT_SLOT_COUNT, TableSet,
};

pub const MAX_MAP_FILE_COUNT: i32 = 512;
const MAP_NAME_MAX_LEN: usize = 16;
const MAX_COMBATANTS: i32 = 500;
const MAX_QUEUED_EVENTS: i32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveDate {
    pub year: i16,
    pub month: i16,
    pub day: i16,
}

impl fmt::Display for SaveDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveHeader {
    /// Words at offsets 24 and 26.
    pub version: [i16; 2],
    pub release: u8,
    pub character_name: String,
    pub description: String,
    pub save_date: SaveDate,
    pub file_time: i32,
    pub game_date: SaveDate,
    pub game_time: u32,
    pub elevation: i16,
    pub map_id: i16,
    pub map_filename: String,
}

impl SaveHeader {
    /// Parses the 30,051-byte header. With `expected` set, the signature and
    /// version words must match that variant.
    pub fn parse(
        r: &mut BigEndianReader<'_>,
        expected: Option<&TableSet>,
    ) -> Result<Self, FormatError> {
        let signature = r.read_bytes(24)?;
        if expected.is_some() && !signature.starts_with(SIGNATURE) {
            return Err(FormatError::BadSignature {
                expected: "FALLOUT SAVE FILE",
            });
        }

        let version = [r.read_i16()?, r.read_i16()?];
        let release = r.read_u8()?;
        if let Some(tables) = expected
            && (version != tables.version || release != RELEASE_MARKER)
        {
            return Err(FormatError::VersionMismatch {
                variant: tables.variant,
                major: version[1],
                minor: version[0],
                release: char::from(release),
            });
        }

        let character_name = r.read_fixed_string(32)?;
        let description = r.read_fixed_string(30)?;

        // Day, month, year on disk.
        let file_day = r.read_i16()?;
        let file_month = r.read_i16()?;
        let file_year = r.read_i16()?;
        let file_time = r.read_i32()?;

        let game_month = r.read_i16()?;
        let game_day = r.read_i16()?;
        let game_year = r.read_i16()?;
        let game_time = r.read_u32()?;

        let elevation = r.read_i16()?;
        let map_id = r.read_i16()?;
        let map_filename = r.read_fixed_string(16)?;

        r.skip(PREVIEW_SIZE + HEADER_PADDING)?;

        Ok(Self {
            version,
            release,
            character_name,
            description,
            save_date: SaveDate {
                year: file_year,
                month: file_month,
                day: file_day,
            },
            file_time,
            game_date: SaveDate {
                year: game_year,
                month: game_month,
                day: game_day,
            },
            game_time,
            elevation,
            map_id,
            map_filename,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFileList {
    pub map_files: Vec<String>,
    pub automap_size: i32,
}

/// `strict` additionally requires at least one map and no empty names.
pub fn parse_map_file_list(
    r: &mut BigEndianReader<'_>,
    strict: bool,
) -> Result<MapFileList, FormatError> {
    let count = r.read_i32()?;
    let min = if strict { 1 } else { 0 };
    if !(min..=MAX_MAP_FILE_COUNT).contains(&count) {
        return Err(FormatError::section(
            SectionId::Handler(3),
            format!("invalid map file count {count}"),
        ));
    }

    let mut map_files = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = r.read_null_terminated_string(MAP_NAME_MAX_LEN)?;
        if strict && name.is_empty() {
            return Err(FormatError::section(
                SectionId::Handler(3),
                "empty map filename",
            ));
        }
        map_files.push(name);
    }

    Ok(MapFileList {
        map_files,
        automap_size: r.read_i32()?,
    })
}

pub fn is_save_map_name(name: &str) -> bool {
    !name.is_empty() && name.is_ascii() && name.to_ascii_uppercase().ends_with(".SAV")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CritterProto {
    pub sneak_working: i32,
    pub flags: i32,
    pub base_stats: [i32; SAVEABLE_STAT_COUNT],
    pub bonus_stats: [i32; SAVEABLE_STAT_COUNT],
    pub skills: [i32; SKILL_COUNT],
    pub body_type: i32,
    pub experience: i32,
    pub kill_type: i32,
}

impl CritterProto {
    pub fn parse(r: &mut BigEndianReader<'_>) -> Result<Self, FormatError> {
        Ok(Self {
            sneak_working: r.read_i32()?,
            flags: r.read_i32()?,
            base_stats: r.read_i32_array::<SAVEABLE_STAT_COUNT>()?,
            bonus_stats: r.read_i32_array::<SAVEABLE_STAT_COUNT>()?,
            skills: r.read_i32_array::<SKILL_COUNT>()?,
            body_type: r.read_i32()?,
            experience: r.read_i32()?,
            kill_type: r.read_i32()?,
        })
    }

    pub fn total_stat(&self, index: usize) -> i32 {
        self.base_stats[index].saturating_add(self.bonus_stats[index])
    }
}

pub fn parse_tagged_skills(
    r: &mut BigEndianReader<'_>,
) -> Result<[i32; TAGGED_SKILL_COUNT], FormatError> {
    r.read_i32_array::<TAGGED_SKILL_COUNT>()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatState {
    pub flags: u32,
    pub combat: Option<CombatData>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatData {
    pub turn_running: i32,
    pub free_move: i32,
    pub exps: i32,
    pub list_com: i32,
    pub list_noncom: i32,
    pub list_total: i32,
    pub dude_cid: i32,
    pub combatant_cids: Vec<i32>,
    /// Fallout 2 only: friendly dead, last target, last item, last move.
    pub ai_info: Vec<[i32; 4]>,
}

impl CombatState {
    pub fn in_combat(&self) -> bool {
        self.combat.is_some()
    }
}

/// Bit 0x01 of the flags marks an active fight; the idle state is 0x02.
pub fn parse_combat_state(
    r: &mut BigEndianReader<'_>,
    with_ai_info: bool,
) -> Result<CombatState, FormatError> {
    let flags = r.read_u32()?;
    if flags & 0x01 == 0 {
        return Ok(CombatState {
            flags,
            combat: None,
        });
    }

    let [
        turn_running,
        free_move,
        exps,
        list_com,
        list_noncom,
        list_total,
        dude_cid,
    ] = r.read_i32_array::<7>()?;

    let section = SectionId::Handler(11);
    if list_com < 0 || list_noncom < 0 || !(0..=MAX_COMBATANTS).contains(&list_total) {
        return Err(FormatError::section(
            section,
            format!("invalid combat list counters {list_com}/{list_noncom}/{list_total}"),
        ));
    }
    if with_ai_info && list_com.checked_add(list_noncom) != Some(list_total) {
        return Err(FormatError::section(
            section,
            "inconsistent combat list counters",
        ));
    }

    let combatant_cids = r.read_i32_vec(list_total as usize)?;
    let mut ai_info = Vec::new();
    if with_ai_info {
        for _ in 0..list_total {
            ai_info.push(r.read_i32_array::<4>()?);
        }
    }

    Ok(CombatState {
        flags,
        combat: Some(CombatData {
            turn_running,
            free_move,
            exps,
            list_com,
            list_noncom,
            list_total,
            dude_cid,
            combatant_cids,
            ai_info,
        }),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcStats {
    pub unspent_skill_points: i32,
    pub level: i32,
    pub experience: i32,
    pub reputation: i32,
    pub karma: i32,
}

impl PcStats {
    pub fn parse(r: &mut BigEndianReader<'_>) -> Result<Self, FormatError> {
        let [unspent_skill_points, level, experience, reputation, karma] =
            r.read_i32_array::<PC_STAT_COUNT>()?;
        Ok(Self {
            unspent_skill_points,
            level,
            experience,
            reputation,
            karma,
        })
    }
}

/// Walks the Fallout 1 event queue without keeping it; only its length
/// matters.
pub fn skip_event_queue(r: &mut BigEndianReader<'_>) -> Result<usize, FormatError> {
    let section = SectionId::Handler(15);
    let count = r.read_i32()?;
    if !(0..=MAX_QUEUED_EVENTS).contains(&count) {
        return Err(FormatError::section(
            section,
            format!("invalid event queue count {count}"),
        ));
    }

    for _ in 0..count {
        let [_time, event_type, _object_id] = r.read_i32_array::<3>()?;
        let payload = match event_type {
            0 => 24, // drug effect: stats[3] + modifiers[3]
            2 => 12, // withdrawal
            3 => 8,  // script
            6 => 8,  // radiation
            1 | 4 | 5 | 7..=12 => 0,
            other => {
                return Err(FormatError::section(
                    section,
                    format!("unknown event type {other}"),
                ));
            }
        };
        r.skip(payload)?;
    }

    Ok(count as usize)
}

pub fn is_trait_value_valid(value: i32) -> bool {
    value == -1 || (0..TRAIT_NAMES.len() as i32).contains(&value)
}

/// Raw slot values. Out-of-range indices are kept and surface later as
/// lookup warnings.
pub fn parse_traits(r: &mut BigEndianReader<'_>) -> Result<[i32; TRAIT_SLOT_COUNT], FormatError> {
    r.read_i32_array::<TRAIT_SLOT_COUNT>()
}

#[cfg(test)]
mod tests {
    use super::{parse_combat_state, parse_map_file_list, skip_event_queue};
    use crate::reader::BigEndianReader;

    fn words(values: &[i32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    #[test]
    fn idle_combat_state_is_one_word() {
        let bytes = words(&[0x02, 99]);
        let mut r = BigEndianReader::new(&bytes);
        let state = parse_combat_state(&mut r, true).expect("combat state");
        assert!(!state.in_combat());
        assert_eq!(r.position(), 4);
    }

    #[test]
    fn fallout2_combat_counters_must_add_up() {
        let bytes = words(&[0x01, 0, 0, 0, 2, 2, 3, 7, 1, 2, 3]);
        let mut r = BigEndianReader::new(&bytes);
        assert!(parse_combat_state(&mut r, true).is_err());

        let mut r = BigEndianReader::new(&bytes);
        let state = parse_combat_state(&mut r, false).expect("fallout 1 tolerates mismatch");
        assert_eq!(
            state.combat.map(|c| c.combatant_cids),
            Some(vec![1, 2, 3])
        );
    }

    #[test]
    fn event_queue_rejects_unknown_types() {
        let good = words(&[2, 0, 1, 0, 0, 3, 1, 5, 6]);
        let mut r = BigEndianReader::new(&good);
        assert_eq!(skip_event_queue(&mut r).expect("queue"), 2);
        assert_eq!(r.remaining(), 0);

        let bad = words(&[1, 0, 13, 0]);
        let mut r = BigEndianReader::new(&bad);
        assert!(skip_event_queue(&mut r).is_err());
    }

    #[test]
    fn strict_map_list_needs_a_name() {
        let mut bytes = words(&[1]);
        bytes.push(0);
        bytes.extend(words(&[0]));
        let mut r = BigEndianReader::new(&bytes);
        assert!(parse_map_file_list(&mut r, true).is_err());
        let mut r = BigEndianReader::new(&bytes);
        let list = parse_map_file_list(&mut r, false).expect("lenient list");
        assert_eq!(list.map_files, vec![String::new()]);
    }
}
