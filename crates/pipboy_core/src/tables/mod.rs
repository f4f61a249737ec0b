//! Static per-variant layout description: which handler owns each editable
//! field, byte offsets inside those handlers, name tables and skill
//! formulas. Resolved once per decode and shared read-only.

pub mod fallout1;
pub mod fallout2;

use crate::layout::SectionId;
use crate::variant::GameVariant;

pub const SIGNATURE: &[u8] = b"FALLOUT SAVE FILE";
pub const PREVIEW_SIZE: usize = 29_792; // 224x133 thumbnail
pub const HEADER_PADDING: usize = 128;
pub const RELEASE_MARKER: u8 = b'R';

pub const I32_WIDTH: usize = 4;
pub const SAVEABLE_STAT_COUNT: usize = 35;
pub const SPECIAL_COUNT: usize = 7;
pub const SKILL_COUNT: usize = 18;
pub const TAGGED_SKILL_COUNT: usize = 4;
pub const PC_STAT_COUNT: usize = 5;
pub const TRAIT_SLOT_COUNT: usize = 2;
pub const MAX_PERK_RANK: i32 = 20;
pub const SKILL_CAP: i32 = 300;
pub const MAX_INVENTORY_LINES: usize = 1000;
pub const GAME_TIME_TICKS_PER_YEAR: u32 = 315_360_000;

pub const STAT_STRENGTH: usize = 0;
pub const STAT_PERCEPTION: usize = 1;
pub const STAT_ENDURANCE: usize = 2;
pub const STAT_CHARISMA: usize = 3;
pub const STAT_INTELLIGENCE: usize = 4;
pub const STAT_AGILITY: usize = 5;
pub const STAT_LUCK: usize = 6;
pub const STAT_MAX_HP: usize = 7;
pub const STAT_MAX_AP: usize = 8;
pub const STAT_ARMOR_CLASS: usize = 9;
pub const STAT_MELEE_DAMAGE: usize = 11;
pub const STAT_CARRY_WEIGHT: usize = 12;
pub const STAT_SEQUENCE: usize = 13;
pub const STAT_HEALING_RATE: usize = 14;
pub const STAT_CRITICAL_CHANCE: usize = 15;
pub const STAT_RADIATION_RESISTANCE: usize = 31;
pub const STAT_POISON_RESISTANCE: usize = 32;
pub const STAT_AGE: usize = 33;
pub const STAT_GENDER: usize = 34;

pub const SKILL_SMALL_GUNS: usize = 0;
pub const SKILL_BIG_GUNS: usize = 1;
pub const SKILL_ENERGY_WEAPONS: usize = 2;
pub const SKILL_UNARMED: usize = 3;
pub const SKILL_MELEE_WEAPONS: usize = 4;
pub const SKILL_THROWING: usize = 5;
pub const SKILL_FIRST_AID: usize = 6;
pub const SKILL_DOCTOR: usize = 7;
pub const SKILL_SNEAK: usize = 8;
pub const SKILL_LOCKPICK: usize = 9;
pub const SKILL_STEAL: usize = 10;
pub const SKILL_TRAPS: usize = 11;
pub const SKILL_SCIENCE: usize = 12;
pub const SKILL_REPAIR: usize = 13;
pub const SKILL_SPEECH: usize = 14;
pub const SKILL_BARTER: usize = 15;
pub const SKILL_GAMBLING: usize = 16;
pub const SKILL_OUTDOORSMAN: usize = 17;

pub const TRAIT_GOOD_NATURED: i32 = 10;
pub const TRAIT_GIFTED: i32 = 15;

pub const PERK_SURVIVALIST: usize = 16;
pub const PERK_MR_FIXIT: usize = 31;
pub const PERK_MEDIC: usize = 32;
pub const PERK_MASTER_THIEF: usize = 33;
pub const PERK_SPEAKER: usize = 34;
pub const PERK_RANGER: usize = 47;
pub const PERK_TAG: usize = 51;

// Critter proto (handler 6), 372 bytes in both games.
pub const PROTO_LEN: usize = 372;
pub const PROTO_BASE_STATS_OFFSET: usize = 8;
pub const PROTO_BONUS_STATS_OFFSET: usize =
    PROTO_BASE_STATS_OFFSET + SAVEABLE_STAT_COUNT * I32_WIDTH;
pub const PROTO_SKILLS_OFFSET: usize = PROTO_BONUS_STATS_OFFSET + SAVEABLE_STAT_COUNT * I32_WIDTH;
pub const PROTO_BODY_TYPE_OFFSET: usize = PROTO_SKILLS_OFFSET + SKILL_COUNT * I32_WIDTH;
pub const PROTO_EXPERIENCE_OFFSET: usize = PROTO_BODY_TYPE_OFFSET + I32_WIDTH;

// PC stats (handler 13).
pub const PC_STATS_UNSPENT_SKILL_POINTS_OFFSET: usize = 0;
pub const PC_STATS_LEVEL_OFFSET: usize = I32_WIDTH;
pub const PC_STATS_EXPERIENCE_OFFSET: usize = I32_WIDTH * 2;
pub const PC_STATS_REPUTATION_OFFSET: usize = I32_WIDTH * 3;
pub const PC_STATS_KARMA_OFFSET: usize = I32_WIDTH * 4;

// 18 base fields + 3 inventory header fields + 8 critter fields.
pub const PLAYER_HP_OFFSET: usize = 116;

pub const STAT_NAMES: [&str; SAVEABLE_STAT_COUNT] = [
    "Strength",
    "Perception",
    "Endurance",
    "Charisma",
    "Intelligence",
    "Agility",
    "Luck",
    "Max HP",
    "Max AP",
    "Armor Class",
    "Unarmed Damage",
    "Melee Damage",
    "Carry Weight",
    "Sequence",
    "Healing Rate",
    "Critical Chance",
    "Better Criticals",
    "DT Normal",
    "DT Laser",
    "DT Fire",
    "DT Plasma",
    "DT Electrical",
    "DT EMP",
    "DT Explosion",
    "DR Normal",
    "DR Laser",
    "DR Fire",
    "DR Plasma",
    "DR Electrical",
    "DR EMP",
    "DR Explosion",
    "Radiation Resistance",
    "Poison Resistance",
    "Age",
    "Gender",
];

pub const SKILL_NAMES: [&str; SKILL_COUNT] = [
    "Small Guns",
    "Big Guns",
    "Energy Weapons",
    "Unarmed",
    "Melee Weapons",
    "Throwing",
    "First Aid",
    "Doctor",
    "Sneak",
    "Lockpick",
    "Steal",
    "Traps",
    "Science",
    "Repair",
    "Speech",
    "Barter",
    "Gambling",
    "Outdoorsman",
];

pub const TRAIT_NAMES: [&str; 16] = [
    "Fast Metabolism",
    "Bruiser",
    "Small Frame",
    "One Hander",
    "Finesse",
    "Kamikaze",
    "Heavy Handed",
    "Fast Shot",
    "Bloody Mess",
    "Jinxed",
    "Good Natured",
    "Chem Reliant",
    "Chem Resistant",
    "Night Person",
    "Skilled",
    "Gifted",
];

/// `default + multiplier * (stat1 [+ stat2]) / divisor`, using SPECIAL
/// totals.
#[derive(Debug, Clone, Copy)]
pub struct SkillFormula {
    pub default_value: i32,
    pub multiplier: i32,
    pub stat1: usize,
    pub stat2: Option<usize>,
    pub divisor: i32,
}

/// A perk that adds `amount` to each listed skill while its rank is > 0.
#[derive(Debug, Clone, Copy)]
pub struct PerkSkillModifier {
    pub perk: usize,
    pub skills: &'static [usize],
    pub amount: i32,
}

/// Handlers owning each anchored field.
#[derive(Debug, Clone, Copy)]
pub struct SectionMap {
    pub player_object: SectionId,
    pub critter_proto: SectionId,
    pub kill_counts: SectionId,
    pub tagged_skills: SectionId,
    pub perks: SectionId,
    pub pc_stats: SectionId,
    pub traits: SectionId,
    pub preferences: Option<SectionId>,
}

#[derive(Debug)]
pub struct TableSet {
    pub variant: GameVariant,
    /// The two i16 words at header offsets 24 and 26.
    pub version: [i16; 2],
    pub stat_names: &'static [&'static str],
    pub skill_names: &'static [&'static str],
    pub perk_names: &'static [&'static str],
    pub trait_names: &'static [&'static str],
    pub kill_type_names: &'static [&'static str],
    pub sections: SectionMap,
    pub section_names: &'static [(u8, &'static str)],
    pub skill_formulas: &'static [SkillFormula; SKILL_COUNT],
    pub perk_skill_modifiers: &'static [PerkSkillModifier],
    pub difficulty_affects_skills: bool,
}

impl TableSet {
    pub fn perk_count(&self) -> usize {
        self.perk_names.len()
    }

    pub fn kill_type_count(&self) -> usize {
        self.kill_type_names.len()
    }

    pub fn perk_name(&self, index: usize) -> Option<&'static str> {
        self.perk_names.get(index).copied()
    }

    pub fn trait_name(&self, index: i32) -> Option<&'static str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.trait_names.get(i).copied())
    }

    pub fn skill_name(&self, index: usize) -> Option<&'static str> {
        self.skill_names.get(index).copied()
    }

    pub fn stat_name(&self, index: usize) -> Option<&'static str> {
        self.stat_names.get(index).copied()
    }

    pub fn kill_type_name(&self, index: usize) -> Option<&'static str> {
        self.kill_type_names.get(index).copied()
    }

    pub fn section_name(&self, id: SectionId) -> &'static str {
        match id {
            SectionId::Header => "header",
            SectionId::Tail => "tail",
            SectionId::Handler(n) => self
                .section_names
                .iter()
                .find(|(handler, _)| *handler == n)
                .map(|(_, name)| *name)
                .unwrap_or("unknown"),
        }
    }

    pub fn perk_skill_modifier(&self, skill: usize, has_perk: impl Fn(usize) -> bool) -> i32 {
        self.perk_skill_modifiers
            .iter()
            .filter(|m| m.skills.contains(&skill) && has_perk(m.perk))
            .map(|m| m.amount)
            .sum()
    }
}
