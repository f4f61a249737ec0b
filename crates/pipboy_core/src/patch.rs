//! Typed edits against a decoded [`Model`] and re-encoding back to bytes.
//!
//! Encoding starts from the captured section bytes and only overwrites the
//! anchored fields, so anything the decoder did not interpret is carried over
//! untouched.

use std::path::Path;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::derive::editable_age_base;
use crate::error::{EditError, EditRejection, EncodeError};
use crate::layout::SectionId;
use crate::model::Model;
use crate::tables::{
    I32_WIDTH, MAX_PERK_RANK, PC_STATS_EXPERIENCE_OFFSET, PC_STATS_KARMA_OFFSET,
    PC_STATS_LEVEL_OFFSET, PC_STATS_REPUTATION_OFFSET, PC_STATS_UNSPENT_SKILL_POINTS_OFFSET,
    PLAYER_HP_OFFSET, PROTO_BASE_STATS_OFFSET, PROTO_EXPERIENCE_OFFSET, SPECIAL_COUNT, STAT_AGE,
    STAT_GENDER,
};

const LEVEL_RANGE: (i64, i64) = (1, 99);
const SPECIAL_RANGE: (i32, i32) = (1, 10);
const DEFAULT_OUTPUT_NAME: &str = "SAVE_edited.DAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarField {
    Level,
    Experience,
    SkillPoints,
    Karma,
    Reputation,
    HitPoints,
    /// The displayed total; the stored base is recovered from it.
    Age,
    Gender,
}

impl ScalarField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Level => "level",
            Self::Experience => "experience",
            Self::SkillPoints => "skill points",
            Self::Karma => "karma",
            Self::Reputation => "reputation",
            Self::HitPoints => "hit points",
            Self::Age => "age",
            Self::Gender => "gender",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditOp {
    SetScalar(ScalarField, i64),
    SetAttributeBase(usize, i32),
    SetTraitSlot { slot: usize, index: Option<i32> },
    SetPerk(usize, i32),
    ClearPerk(usize),
    SetInventoryQuantity(i32, i32),
    AddInventory(i32, i32),
    /// `None` removes every line with the PID.
    RemoveInventory(i32, Option<i32>),
}

/// Applies `edits` in order. Each op is checked before it touches the model,
/// so a rejected op changes nothing; ops before it stay applied. Derived
/// values are recomputed once at the end, including on failure.
pub fn apply_edits(model: &mut Model, edits: &[EditOp]) -> Result<(), EditError> {
    let mut outcome = Ok(());
    for (index, op) in edits.iter().enumerate() {
        trace!("applying edit #{index}: {op:?}");
        if let Err(reason) = apply_one(model, op) {
            outcome = Err(EditError {
                index,
                op: format!("{op:?}"),
                reason,
            });
            break;
        }
    }
    model.refresh();
    outcome
}

fn apply_one(model: &mut Model, op: &EditOp) -> Result<(), EditRejection> {
    match *op {
        EditOp::SetScalar(field, value) => set_scalar(model, field, value),
        EditOp::SetAttributeBase(index, value) => {
            if index >= SPECIAL_COUNT {
                return Err(EditRejection::UnknownIndex {
                    table: "SPECIAL",
                    index: i64::try_from(index).unwrap_or(i64::MAX),
                    count: SPECIAL_COUNT,
                });
            }
            let name = model.tables.stat_name(index).unwrap_or("SPECIAL");
            let value = in_range(
                name,
                i64::from(value),
                i64::from(SPECIAL_RANGE.0),
                i64::from(SPECIAL_RANGE.1),
            )?;
            model.proto.base_stats[index] = value;
            Ok(())
        }
        EditOp::SetTraitSlot { slot, index } => set_trait_slot(model, slot, index),
        EditOp::SetPerk(index, rank) => {
            check_perk_index(model, index)?;
            let rank = in_range(
                "perk rank",
                i64::from(rank),
                1,
                i64::from(MAX_PERK_RANK),
            )?;
            model.perks[index] = rank;
            Ok(())
        }
        EditOp::ClearPerk(index) => {
            check_perk_index(model, index)?;
            model.perks[index] = 0;
            Ok(())
        }
        EditOp::SetInventoryQuantity(pid, quantity) => {
            in_range("quantity", i64::from(quantity), 0, i64::from(i32::MAX))?;
            model.player.set_item_quantity(pid, quantity)?;
            model.inventory_dirty = true;
            Ok(())
        }
        EditOp::AddInventory(pid, delta) => {
            in_range("quantity", i64::from(delta), 1, i64::from(i32::MAX))?;
            model.player.add_item_quantity(pid, delta)?;
            model.inventory_dirty = true;
            Ok(())
        }
        EditOp::RemoveInventory(pid, quantity) => {
            if let Some(n) = quantity {
                in_range("quantity", i64::from(n), 1, i64::from(i32::MAX))?;
            }
            model.player.remove_item_quantity(pid, quantity)?;
            model.inventory_dirty = true;
            Ok(())
        }
    }
}

fn set_scalar(model: &mut Model, field: ScalarField, value: i64) -> Result<(), EditRejection> {
    let full = (i64::from(i32::MIN), i64::from(i32::MAX));
    let non_negative = (0, i64::from(i32::MAX));
    let name = field.as_str();

    match field {
        ScalarField::Level => {
            model.pc_stats.level = in_range(name, value, LEVEL_RANGE.0, LEVEL_RANGE.1)?;
        }
        ScalarField::Experience => {
            let xp = in_range(name, value, non_negative.0, non_negative.1)?;
            model.pc_stats.experience = xp;
            model.proto.experience = xp;
        }
        ScalarField::SkillPoints => {
            model.pc_stats.unspent_skill_points =
                in_range(name, value, non_negative.0, non_negative.1)?;
        }
        ScalarField::Karma => model.pc_stats.karma = in_range(name, value, full.0, full.1)?,
        ScalarField::Reputation => {
            model.pc_stats.reputation = in_range(name, value, full.0, full.1)?;
        }
        ScalarField::HitPoints => {
            let hp = in_range(name, value, non_negative.0, non_negative.1)?;
            model.player.set_hit_points(hp)?;
        }
        ScalarField::Age => {
            let total = in_range(name, value, full.0, full.1)?;
            let bonus = model.proto.bonus_stats[STAT_AGE];
            let base = editable_age_base(total, bonus, model.header.game_time)
                .ok_or(EditRejection::Overflow("age base"))?;
            if base < 0 {
                let min = i64::from(total) - i64::from(base);
                return Err(EditRejection::OutOfRange {
                    field: name,
                    value,
                    min,
                    max: full.1,
                });
            }
            model.proto.base_stats[STAT_AGE] = base;
        }
        ScalarField::Gender => {
            model.proto.base_stats[STAT_GENDER] = in_range(name, value, 0, 1)?;
        }
    }
    Ok(())
}

fn set_trait_slot(
    model: &mut Model,
    slot: usize,
    index: Option<i32>,
) -> Result<(), EditRejection> {
    let trait_count = model.tables.trait_names.len();
    let Some(slots) = model.traits.as_mut() else {
        return Err(EditRejection::Unavailable("traits"));
    };
    if slot >= slots.len() {
        return Err(EditRejection::InvalidTraitSlot(slot));
    }

    let value = match index {
        None => -1,
        Some(index) => {
            let resolved = usize::try_from(index)
                .ok()
                .filter(|&i| i < trait_count)
                .ok_or(EditRejection::UnknownIndex {
                    table: "trait",
                    index: i64::from(index),
                    count: trait_count,
                })?;
            if slots[1 - slot] == index {
                return Err(EditRejection::DuplicateTrait(resolved));
            }
            index
        }
    };
    slots[slot] = value;
    Ok(())
}

fn check_perk_index(model: &Model, index: usize) -> Result<(), EditRejection> {
    if index < model.perks.len() {
        return Ok(());
    }
    Err(EditRejection::UnknownIndex {
        table: "perk",
        index: i64::try_from(index).unwrap_or(i64::MAX),
        count: model.tables.perk_count(),
    })
}

fn in_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<i32, EditRejection> {
    if !(min..=max).contains(&value) {
        return Err(EditRejection::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    i32::try_from(value).map_err(|_| EditRejection::Overflow(field))
}

/// Re-encodes the model. An unedited model reproduces its input exactly.
pub fn encode(model: &Model) -> Result<Vec<u8>, EncodeError> {
    let sections = model.tables.sections;
    let mut layout = model.layout.clone();
    let mut blobs = model.blobs.clone();

    let proto = section_index(model, sections.critter_proto)?;
    for (i, &value) in model.proto.base_stats.iter().enumerate() {
        let offset = PROTO_BASE_STATS_OFFSET + i * I32_WIDTH;
        patch_i32(&mut blobs[proto], sections.critter_proto, "base stat", offset, value)?;
    }
    patch_i32(
        &mut blobs[proto],
        sections.critter_proto,
        "experience",
        PROTO_EXPERIENCE_OFFSET,
        model.proto.experience,
    )?;

    let pc = section_index(model, sections.pc_stats)?;
    let pc_fields = [
        (PC_STATS_UNSPENT_SKILL_POINTS_OFFSET, "skill points", model.pc_stats.unspent_skill_points),
        (PC_STATS_LEVEL_OFFSET, "level", model.pc_stats.level),
        (PC_STATS_EXPERIENCE_OFFSET, "experience", model.pc_stats.experience),
        (PC_STATS_REPUTATION_OFFSET, "reputation", model.pc_stats.reputation),
        (PC_STATS_KARMA_OFFSET, "karma", model.pc_stats.karma),
    ];
    for (offset, field, value) in pc_fields {
        patch_i32(&mut blobs[pc], sections.pc_stats, field, offset, value)?;
    }

    let perks = section_index(model, sections.perks)?;
    for (i, &rank) in model.perks.iter().enumerate() {
        patch_i32(&mut blobs[perks], sections.perks, "perk rank", i * I32_WIDTH, rank)?;
    }

    if let Some(slots) = model.traits {
        let traits = section_index(model, sections.traits)?;
        for (i, &value) in slots.iter().enumerate() {
            patch_i32(&mut blobs[traits], sections.traits, "trait", i * I32_WIDTH, value)?;
        }
    }

    let player = section_index(model, sections.player_object)?;
    if model.inventory_dirty {
        let mut bytes = model.player.emit_bytes()?;
        bytes.extend_from_slice(&model.center_tile.to_be_bytes());
        bytes.extend_from_slice(&model.h5_trailer);
        layout.resize(player, bytes.len())?;
        blobs[player] = bytes;
    } else if let Some(hp) = model.player.hit_points() {
        patch_i32(&mut blobs[player], sections.player_object, "hit points", PLAYER_HP_OFFSET, hp)?;
    }

    for (section, blob) in layout.sections.iter().zip(&blobs) {
        if section.range.len() != blob.len() {
            return Err(EncodeError::PatchOutOfBounds {
                section: section.id,
                field: "section",
                needed: section.range.len(),
                len: blob.len(),
            });
        }
    }
    layout.validate()?;

    let out = blobs.concat();
    if out.len() != layout.file_len {
        return Err(EncodeError::LengthMismatch {
            expected: layout.file_len,
            actual: out.len(),
        });
    }
    Ok(out)
}

fn section_index(model: &Model, id: SectionId) -> Result<usize, EncodeError> {
    model
        .layout
        .position(id)
        .filter(|&index| index < model.blobs.len())
        .ok_or(EncodeError::MissingSection(id))
}

fn patch_i32(
    blob: &mut [u8],
    section: SectionId,
    field: &'static str,
    offset: usize,
    value: i32,
) -> Result<(), EncodeError> {
    let end = offset + I32_WIDTH;
    let Some(slot) = blob.get_mut(offset..end) else {
        return Err(EncodeError::PatchOutOfBounds {
            section,
            field,
            needed: end,
            len: blob.len(),
        });
    };
    slot.copy_from_slice(&value.to_be_bytes());
    Ok(())
}

/// `SAVE.DAT` -> `SAVE_edited.DAT`. Only the file name of `input` is used.
pub fn output_name_hint(input: &str) -> String {
    let path = Path::new(input);
    let Some(stem) = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
    else {
        return DEFAULT_OUTPUT_NAME.to_string();
    };

    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{stem}_edited.{ext}"),
        None => format!("{stem}_edited"),
    }
}
