//! The decoded save: raw section values plus the derived view that is
//! recomputed after decode and after every edit batch.

use serde::{Deserialize, Serialize};

use crate::decode::RawSave;
use crate::derive::{self, DerivedView};
use crate::error::LookupWarning;
use crate::gender::Gender;
use crate::layout::FileLayout;
use crate::object::GameObject;
use crate::sections::{CombatState, CritterProto, PcStats, SaveDate, SaveHeader};
use crate::tables::{SKILL_COUNT, STAT_GENDER, TAGGED_SKILL_COUNT, TRAIT_SLOT_COUNT, TableSet};
use crate::variant::GameVariant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeValue {
    pub index: usize,
    pub name: String,
    pub base: i32,
    pub bonus: i32,
    pub total: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillValue {
    pub index: usize,
    pub name: String,
    pub raw: i32,
    pub tag_bonus: i32,
    pub bonus: i32,
    pub total: i32,
}

/// Age is stored as a base stat but displayed with the in-game years that
/// have passed since the character was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgeValue {
    pub base: i32,
    pub bonus: i32,
    pub elapsed_years: i32,
    pub total: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DerivedStat {
    pub name: String,
    pub value: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraitRef {
    pub slot: usize,
    pub index: i32,
    pub name: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerkEntry {
    pub index: usize,
    pub name: String,
    pub rank: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KillCount {
    pub index: usize,
    pub name: String,
    pub count: i32,
}

/// One PID in the editable inventory view. Duplicate stored lines for the
/// same PID are summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InventoryLine {
    pub pid: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) tables: &'static TableSet,
    pub(crate) header: SaveHeader,
    pub(crate) player_combat_id: i32,
    pub(crate) global_var_count: usize,
    pub(crate) map_files: Vec<String>,
    pub(crate) automap_size: i32,
    pub(crate) player: GameObject,
    pub(crate) center_tile: i32,
    pub(crate) h5_trailer: Vec<u8>,
    pub(crate) proto: CritterProto,
    pub(crate) kill_counts: Vec<i32>,
    pub(crate) tagged_skills: [i32; TAGGED_SKILL_COUNT],
    pub(crate) perks: Vec<i32>,
    pub(crate) combat: CombatState,
    pub(crate) pc_stats: PcStats,
    pub(crate) traits: Option<[i32; TRAIT_SLOT_COUNT]>,
    pub(crate) party_member_count: Option<usize>,
    pub(crate) ai_packet_count: Option<usize>,
    pub(crate) game_difficulty: Option<i32>,
    pub(crate) layout: FileLayout,
    pub(crate) blobs: Vec<Vec<u8>>,
    /// Set once the inventory no longer matches the captured player object
    /// bytes.
    pub(crate) inventory_dirty: bool,
    view: DerivedView,
    warnings: Vec<LookupWarning>,
}

impl Model {
    pub(crate) fn from_decoded(
        tables: &'static TableSet,
        raw: RawSave,
        layout: FileLayout,
        blobs: Vec<Vec<u8>>,
    ) -> Self {
        let mut model = Self {
            tables,
            header: raw.header,
            player_combat_id: raw.player_combat_id,
            global_var_count: raw.global_var_count,
            map_files: raw.map_files,
            automap_size: raw.automap_size,
            player: raw.player,
            center_tile: raw.center_tile,
            h5_trailer: raw.h5_trailer,
            proto: raw.proto,
            kill_counts: raw.kill_counts,
            tagged_skills: raw.tagged_skills,
            perks: raw.perks,
            combat: raw.combat,
            pc_stats: raw.pc_stats,
            traits: raw.traits,
            party_member_count: raw.party_member_count,
            ai_packet_count: raw.ai_packet_count,
            game_difficulty: raw.game_difficulty,
            layout,
            blobs,
            inventory_dirty: false,
            view: DerivedView::default(),
            warnings: Vec::new(),
        };
        model.refresh();
        model
    }

    /// Recomputes every bonus, total and derived stat from the raw fields.
    pub(crate) fn refresh(&mut self) {
        self.view = derive::compute(self);
        self.warnings = lookup_warnings(self);
    }

    pub fn variant(&self) -> GameVariant {
        self.tables.variant
    }

    pub fn tables(&self) -> &'static TableSet {
        self.tables
    }

    pub fn header(&self) -> &SaveHeader {
        &self.header
    }

    pub fn name(&self) -> &str {
        &self.header.character_name
    }

    pub fn description(&self) -> &str {
        &self.header.description
    }

    pub fn map_filename(&self) -> &str {
        &self.header.map_filename
    }

    pub fn map_id(&self) -> i16 {
        self.header.map_id
    }

    pub fn elevation(&self) -> i16 {
        self.header.elevation
    }

    pub fn game_date(&self) -> SaveDate {
        self.header.game_date
    }

    pub fn save_date(&self) -> SaveDate {
        self.header.save_date
    }

    pub fn game_time(&self) -> u32 {
        self.header.game_time
    }

    pub fn file_time(&self) -> i32 {
        self.header.file_time
    }

    pub fn version(&self) -> [i16; 2] {
        self.header.version
    }

    pub fn player_combat_id(&self) -> i32 {
        self.player_combat_id
    }

    pub fn global_var_count(&self) -> usize {
        self.global_var_count
    }

    pub fn map_files(&self) -> &[String] {
        &self.map_files
    }

    /// Fallout 2 only; Fallout 1 saves store zero here.
    pub fn automap_size(&self) -> i32 {
        self.automap_size
    }

    pub fn party_member_count(&self) -> Option<usize> {
        self.party_member_count
    }

    pub fn ai_packet_count(&self) -> Option<usize> {
        self.ai_packet_count
    }

    pub fn game_difficulty(&self) -> Option<i32> {
        self.game_difficulty
    }

    pub fn player(&self) -> &GameObject {
        &self.player
    }

    pub fn center_tile(&self) -> i32 {
        self.center_tile
    }

    pub fn proto(&self) -> &CritterProto {
        &self.proto
    }

    pub fn combat(&self) -> &CombatState {
        &self.combat
    }

    pub fn pc_stats(&self) -> &PcStats {
        &self.pc_stats
    }

    pub fn level(&self) -> i32 {
        self.pc_stats.level
    }

    pub fn experience(&self) -> i32 {
        self.pc_stats.experience
    }

    pub fn skill_points(&self) -> i32 {
        self.pc_stats.unspent_skill_points
    }

    pub fn karma(&self) -> i32 {
        self.pc_stats.karma
    }

    pub fn reputation(&self) -> i32 {
        self.pc_stats.reputation
    }

    pub fn gender(&self) -> Gender {
        Gender::from(self.proto.base_stats[STAT_GENDER])
    }

    pub fn hit_points(&self) -> Option<i32> {
        self.player.hit_points()
    }

    pub fn special(&self) -> &[AttributeValue] {
        &self.view.special
    }

    pub fn skills(&self) -> &[SkillValue] {
        &self.view.skills
    }

    pub fn age(&self) -> AgeValue {
        self.view.age
    }

    pub fn derived_stats(&self) -> &[DerivedStat] {
        &self.view.derived_stats
    }

    pub fn next_level_xp(&self) -> i64 {
        self.view.next_level_xp
    }

    pub fn warnings(&self) -> &[LookupWarning] {
        &self.warnings
    }

    pub fn layout(&self) -> &FileLayout {
        &self.layout
    }

    /// False when the Fallout 1 trait handlers could not be read and were kept
    /// as opaque bytes.
    pub fn traits_available(&self) -> bool {
        self.traits.is_some()
    }

    pub fn trait_slots(&self) -> Option<[i32; TRAIT_SLOT_COUNT]> {
        self.traits
    }

    pub fn traits(&self) -> Vec<TraitRef> {
        let Some(slots) = self.traits else {
            return Vec::new();
        };
        slots
            .iter()
            .enumerate()
            .filter(|(_, index)| **index >= 0)
            .map(|(slot, &index)| TraitRef {
                slot,
                index,
                name: self.tables.trait_name(index),
            })
            .collect()
    }

    pub fn perk_ranks(&self) -> &[i32] {
        &self.perks
    }

    pub fn perk_rank(&self, index: usize) -> i32 {
        self.perks.get(index).copied().unwrap_or(0)
    }

    /// Perks with a positive rank, in table order.
    pub fn perks(&self) -> Vec<PerkEntry> {
        self.perks
            .iter()
            .enumerate()
            .filter(|(_, rank)| **rank > 0)
            .map(|(index, &rank)| PerkEntry {
                index,
                name: self.perk_display_name(index),
                rank,
            })
            .collect()
    }

    pub fn perk_display_name(&self, index: usize) -> String {
        self.tables
            .perk_name(index)
            .map_or_else(|| format!("Unknown ({index})"), str::to_string)
    }

    pub fn inventory(&self) -> Vec<InventoryLine> {
        let mut lines: Vec<InventoryLine> = Vec::new();
        for item in &self.player.inventory {
            let pid = item.object.pid;
            if lines.iter().any(|line| line.pid == pid) {
                continue;
            }
            let quantity = self.player.quantity_of(pid);
            lines.push(InventoryLine {
                pid,
                quantity: i32::try_from(quantity).unwrap_or(i32::MAX),
            });
        }
        lines
    }

    pub fn kill_counts(&self) -> &[i32] {
        &self.kill_counts
    }

    pub fn kills(&self) -> Vec<KillCount> {
        self.kill_counts
            .iter()
            .enumerate()
            .map(|(index, &count)| KillCount {
                index,
                name: self
                    .tables
                    .kill_type_name(index)
                    .map_or_else(|| format!("Unknown ({index})"), str::to_string),
                count,
            })
            .collect()
    }

    pub fn tagged_skill_slots(&self) -> [i32; TAGGED_SKILL_COUNT] {
        self.tagged_skills
    }

    /// Tagged skill indices in slot order, unset slots skipped.
    pub fn tagged_skills(&self) -> Vec<usize> {
        self.tagged_skills
            .iter()
            .filter_map(|&value| usize::try_from(value).ok())
            .filter(|&index| index < SKILL_COUNT)
            .collect()
    }

    pub fn is_skill_tagged(&self, skill: usize) -> bool {
        self.tagged_skills().contains(&skill)
    }
}

fn lookup_warnings(model: &Model) -> Vec<LookupWarning> {
    let tables = model.tables;
    let mut warnings = Vec::new();

    if let Some(slots) = model.traits {
        for (slot, &value) in slots.iter().enumerate() {
            if value != -1 && tables.trait_name(value).is_none() {
                warnings.push(LookupWarning {
                    table: "trait",
                    location: format!("traits[{slot}]"),
                    raw: value,
                });
            }
        }
    }

    for (index, &rank) in model.perks.iter().enumerate() {
        if rank != 0 && (rank < 0 || tables.perk_name(index).is_none()) {
            warnings.push(LookupWarning {
                table: "perk",
                location: format!("perks[{index}]"),
                raw: rank,
            });
        }
    }

    for (slot, &value) in model.tagged_skills.iter().enumerate() {
        let resolves = usize::try_from(value).is_ok_and(|i| tables.skill_name(i).is_some());
        if value != -1 && !resolves {
            warnings.push(LookupWarning {
                table: "skill",
                location: format!("tagged_skills[{slot}]"),
                raw: value,
            });
        }
    }

    for (index, &count) in model.kill_counts.iter().enumerate() {
        if count < 0 {
            warnings.push(LookupWarning {
                table: "kill type",
                location: format!("kill_counts[{index}]"),
                raw: count,
            });
        }
    }

    warnings
}
