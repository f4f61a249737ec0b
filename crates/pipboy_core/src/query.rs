//! Single-field reads and the capability summary used by the CLI.
//!
//! Header fields are answered from the header alone, so they work on saves
//! whose later sections do not decode.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::decode::{HEADER_LEN, decode_raw, detect};
use crate::derive::{age_total, next_level_xp};
use crate::error::FormatError;
use crate::gender::Gender;
use crate::model::Model;
use crate::reader::BigEndianReader;
use crate::sections::{SaveDate, SaveHeader};
use crate::tables::{STAT_AGE, STAT_GENDER, STAT_MAX_HP};
use crate::variant::GameVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Game,
    Name,
    Description,
    Map,
    MapId,
    Elevation,
    GameDate,
    SaveDate,
    GameTime,
    Gender,
    Age,
    Level,
    Experience,
    SkillPoints,
    Karma,
    Reputation,
    HitPoints,
    MaxHitPoints,
    NextLevelXp,
}

impl Field {
    pub const ALL: [Field; 19] = [
        Field::Game,
        Field::Name,
        Field::Description,
        Field::Map,
        Field::MapId,
        Field::Elevation,
        Field::GameDate,
        Field::SaveDate,
        Field::GameTime,
        Field::Gender,
        Field::Age,
        Field::Level,
        Field::Experience,
        Field::SkillPoints,
        Field::Karma,
        Field::Reputation,
        Field::HitPoints,
        Field::MaxHitPoints,
        Field::NextLevelXp,
    ];

    /// Key used in `key=value` output and JSON objects.
    pub fn key(self) -> &'static str {
        match self {
            Self::Game => "game",
            Self::Name => "name",
            Self::Description => "description",
            Self::Map => "map",
            Self::MapId => "map_id",
            Self::Elevation => "elevation",
            Self::GameDate => "game_date",
            Self::SaveDate => "save_date",
            Self::GameTime => "game_time",
            Self::Gender => "gender",
            Self::Age => "age",
            Self::Level => "level",
            Self::Experience => "xp",
            Self::SkillPoints => "skill_points",
            Self::Karma => "karma",
            Self::Reputation => "reputation",
            Self::HitPoints => "hp",
            Self::MaxHitPoints => "max_hp",
            Self::NextLevelXp => "next_level_xp",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    pub fn is_header_field(self) -> bool {
        matches!(
            self,
            Self::Game
                | Self::Name
                | Self::Description
                | Self::Map
                | Self::MapId
                | Self::Elevation
                | Self::GameDate
                | Self::SaveDate
                | Self::GameTime
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Text(String),
    Date(SaveDate),
    Absent,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Date(date) => write!(f, "{date}"),
            Self::Absent => f.write_str("none"),
        }
    }
}

/// Reads one field. Header fields skip the section walk entirely; the rest
/// decode sections but not the derived view.
pub fn read_field(
    bytes: &[u8],
    field: Field,
    hint: Option<GameVariant>,
) -> Result<FieldValue, FormatError> {
    if field.is_header_field() {
        let (variant, header) = read_header(bytes, hint)?;
        return Ok(header_field(variant, &header, field));
    }

    let (tables, raw) = decode_raw(bytes, hint)?;
    let proto = &raw.proto;
    let value = match field {
        Field::Gender => FieldValue::Text(Gender::from(proto.base_stats[STAT_GENDER]).to_string()),
        Field::Age => FieldValue::Int(i64::from(age_total(
            proto.base_stats[STAT_AGE],
            proto.bonus_stats[STAT_AGE],
            raw.header.game_time,
        ))),
        Field::Level => FieldValue::Int(i64::from(raw.pc_stats.level)),
        Field::Experience => FieldValue::Int(i64::from(raw.pc_stats.experience)),
        Field::SkillPoints => FieldValue::Int(i64::from(raw.pc_stats.unspent_skill_points)),
        Field::Karma => FieldValue::Int(i64::from(raw.pc_stats.karma)),
        Field::Reputation => FieldValue::Int(i64::from(raw.pc_stats.reputation)),
        Field::HitPoints => raw
            .player
            .hit_points()
            .map_or(FieldValue::Absent, |hp| FieldValue::Int(i64::from(hp))),
        Field::MaxHitPoints => FieldValue::Int(i64::from(proto.total_stat(STAT_MAX_HP))),
        Field::NextLevelXp => FieldValue::Int(next_level_xp(raw.pc_stats.level)),
        header => header_field(tables.variant, &raw.header, header),
    };
    Ok(value)
}

/// Parses only the 30,051-byte header, detecting the variant from its
/// version words unless `hint` is given.
pub fn read_header(
    bytes: &[u8],
    hint: Option<GameVariant>,
) -> Result<(GameVariant, SaveHeader), FormatError> {
    detect(bytes, hint, |variant, check_header| {
        let mut r = BigEndianReader::new(&bytes[..HEADER_LEN]);
        let expected = check_header.then(|| variant.tables());
        let header = SaveHeader::parse(&mut r, expected)?;
        Ok((variant, header))
    })
}

fn header_field(variant: GameVariant, header: &SaveHeader, field: Field) -> FieldValue {
    match field {
        Field::Game => FieldValue::Text(variant.as_str().to_string()),
        Field::Name => FieldValue::Text(header.character_name.clone()),
        Field::Description => FieldValue::Text(header.description.clone()),
        Field::Map => FieldValue::Text(header.map_filename.clone()),
        Field::MapId => FieldValue::Int(i64::from(header.map_id)),
        Field::Elevation => FieldValue::Int(i64::from(header.elevation)),
        Field::GameDate => FieldValue::Date(header.game_date),
        Field::SaveDate => FieldValue::Date(header.save_date),
        Field::GameTime => FieldValue::Int(i64::from(header.game_time)),
        _ => FieldValue::Absent,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityIssue {
    /// Some section boundary came from a heuristic search.
    LowConfidenceLayout,
    /// Fallout 1 trait handlers were unreadable; trait edits are refused.
    TraitsUnavailable,
    /// The player object is not a critter, so hit points cannot be edited.
    HitPointsUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Capabilities {
    pub can_query: bool,
    pub can_plan_edits: bool,
    pub can_apply_edits: bool,
    pub issues: Vec<CapabilityIssue>,
}

pub fn capabilities(model: &Model) -> Capabilities {
    let mut issues = Vec::new();
    if model.layout().min_confidence() < 1.0 {
        issues.push(CapabilityIssue::LowConfidenceLayout);
    }
    if !model.traits_available() {
        issues.push(CapabilityIssue::TraitsUnavailable);
    }
    if !model.player().is_critter() {
        issues.push(CapabilityIssue::HitPointsUnavailable);
    }

    Capabilities {
        can_query: true,
        can_plan_edits: true,
        can_apply_edits: true,
        issues,
    }
}
