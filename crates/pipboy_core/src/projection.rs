//! JSON-shaped view of a [`Model`] and the reverse direction: turning an
//! edited projection back into typed edit ops.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::gender::Gender;
use crate::items::{ItemLookup, NoItems};
use crate::model::{AttributeValue, DerivedStat, KillCount, Model, PerkEntry, SkillValue};
use crate::patch::{EditOp, ScalarField};
use crate::sections::SaveDate;
use crate::tables::TRAIT_SLOT_COUNT;
use crate::variant::GameVariant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraitEntry {
    pub index: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryEntry {
    pub pid: i32,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Projection {
    pub game: GameVariant,
    pub name: String,
    pub description: String,
    pub map: String,
    pub map_id: i16,
    pub elevation: i16,
    pub game_date: SaveDate,
    pub save_date: SaveDate,
    pub game_time: u32,
    pub gender: Gender,
    pub age: i32,
    pub level: i32,
    pub xp: i32,
    pub next_level_xp: i64,
    pub skill_points: i32,
    pub karma: i32,
    pub reputation: i32,
    pub hp: Option<i32>,
    pub special: Vec<AttributeValue>,
    pub skills: Vec<SkillValue>,
    pub traits: Vec<TraitEntry>,
    pub perks: Vec<PerkEntry>,
    pub inventory: Vec<InventoryEntry>,
    pub kill_counts: Vec<KillCount>,
    pub tagged_skills: Vec<usize>,
    pub derived_stats: Vec<DerivedStat>,
}

impl Projection {
    pub fn from_model(model: &Model, items: &dyn ItemLookup) -> Self {
        let inventory = model
            .inventory()
            .into_iter()
            .map(|line| {
                let info = items.lookup(line.pid);
                InventoryEntry {
                    pid: line.pid,
                    quantity: line.quantity,
                    weight: info.as_ref().map(|info| info.weight),
                    name: info.map(|info| info.name),
                }
            })
            .collect();

        let traits = model
            .traits()
            .into_iter()
            .map(|t| TraitEntry {
                index: t.index,
                name: t
                    .name
                    .map_or_else(|| format!("Unknown ({})", t.index), str::to_string),
            })
            .collect();

        Self {
            game: model.variant(),
            name: model.name().to_string(),
            description: model.description().to_string(),
            map: model.map_filename().to_string(),
            map_id: model.map_id(),
            elevation: model.elevation(),
            game_date: model.game_date(),
            save_date: model.save_date(),
            game_time: model.game_time(),
            gender: model.gender(),
            age: model.age().total,
            level: model.level(),
            xp: model.experience(),
            next_level_xp: model.next_level_xp(),
            skill_points: model.skill_points(),
            karma: model.karma(),
            reputation: model.reputation(),
            hp: model.hit_points(),
            special: model.special().to_vec(),
            skills: model.skills().to_vec(),
            traits,
            perks: model.perks(),
            inventory,
            kill_counts: model.kills(),
            tagged_skills: model.tagged_skills(),
            derived_stats: model.derived_stats().to_vec(),
        }
    }
}

/// Ops needed to turn `model` into the submitted projection, plus the
/// read-only paths whose changes were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditPlan {
    pub ops: Vec<EditOp>,
    pub ignored: Vec<String>,
}

impl EditPlan {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    fn ignore(&mut self, path: impl Into<String>) {
        let path = path.into();
        warn!("ignoring change to read-only field {path}");
        self.ignored.push(path);
    }
}

/// Diffs `submitted` against the current model. Submitting an unchanged
/// projection yields no ops.
pub fn plan_edits(model: &Model, submitted: &Projection) -> Result<EditPlan, PlanError> {
    if submitted.game != model.variant() {
        return Err(PlanError::VariantMismatch {
            model: model.variant(),
            projection: submitted.game,
        });
    }
    if submitted.traits.len() > TRAIT_SLOT_COUNT {
        return Err(PlanError::TooManyTraits(submitted.traits.len()));
    }

    let current = Projection::from_model(model, &NoItems);
    let mut plan = EditPlan::default();

    plan_read_only(&current, submitted, &mut plan);
    plan_scalars(&current, submitted, &mut plan);
    plan_special(&current, submitted, &mut plan);
    plan_traits(model, submitted, &mut plan);
    plan_perks(model, submitted, &mut plan);
    plan_inventory(&current, submitted, &mut plan);

    Ok(plan)
}

fn plan_read_only(current: &Projection, submitted: &Projection, plan: &mut EditPlan) {
    let checks = [
        ("name", current.name != submitted.name),
        ("description", current.description != submitted.description),
        ("map", current.map != submitted.map),
        ("map_id", current.map_id != submitted.map_id),
        ("elevation", current.elevation != submitted.elevation),
        ("game_date", current.game_date != submitted.game_date),
        ("save_date", current.save_date != submitted.save_date),
        ("game_time", current.game_time != submitted.game_time),
        ("next_level_xp", current.next_level_xp != submitted.next_level_xp),
        ("skills", current.skills != submitted.skills),
        ("tagged_skills", current.tagged_skills != submitted.tagged_skills),
        ("kill_counts", current.kill_counts != submitted.kill_counts),
        ("derived_stats", current.derived_stats != submitted.derived_stats),
    ];
    for (path, changed) in checks {
        if changed {
            plan.ignore(path);
        }
    }
    if current.hp.is_some() && submitted.hp.is_none() {
        plan.ignore("hp");
    }
}

fn plan_scalars(current: &Projection, submitted: &Projection, plan: &mut EditPlan) {
    if current.gender != submitted.gender {
        plan.ops.push(EditOp::SetScalar(
            ScalarField::Gender,
            i64::from(i32::from(submitted.gender)),
        ));
    }

    let scalars = [
        (ScalarField::Age, current.age, submitted.age),
        (ScalarField::Level, current.level, submitted.level),
        (ScalarField::Experience, current.xp, submitted.xp),
        (ScalarField::SkillPoints, current.skill_points, submitted.skill_points),
        (ScalarField::Karma, current.karma, submitted.karma),
        (ScalarField::Reputation, current.reputation, submitted.reputation),
    ];
    for (field, old, new) in scalars {
        if old != new {
            plan.ops.push(EditOp::SetScalar(field, i64::from(new)));
        }
    }

    if let Some(hp) = submitted.hp
        && current.hp != Some(hp)
    {
        plan.ops
            .push(EditOp::SetScalar(ScalarField::HitPoints, i64::from(hp)));
    }
}

fn plan_special(current: &Projection, submitted: &Projection, plan: &mut EditPlan) {
    for entry in &submitted.special {
        let Some(existing) = current.special.iter().find(|a| a.index == entry.index) else {
            plan.ignore(format!("special[{}]", entry.index));
            continue;
        };
        if entry.base != existing.base {
            plan.ops
                .push(EditOp::SetAttributeBase(entry.index, entry.base));
        }
        // A total moved along with an edited base is not a separate change.
        let total_follows_base = entry.total == entry.base.saturating_add(existing.bonus);
        if entry.bonus != existing.bonus || (entry.total != existing.total && !total_follows_base) {
            plan.ignore(format!("special.{}.bonus", existing.name));
        }
    }
}

fn plan_traits(model: &Model, submitted: &Projection, plan: &mut EditPlan) {
    let current: Vec<i32> = model.traits().iter().map(|t| t.index).collect();
    let wanted: Vec<i32> = submitted.traits.iter().map(|t| t.index).collect();
    if current == wanted {
        return;
    }

    let slots = model.trait_slots().unwrap_or([-1; TRAIT_SLOT_COUNT]);
    let target: [Option<i32>; TRAIT_SLOT_COUNT] = std::array::from_fn(|i| wanted.get(i).copied());
    let changed: Vec<usize> = (0..TRAIT_SLOT_COUNT)
        .filter(|&slot| target[slot].unwrap_or(-1) != slots[slot])
        .collect();

    // Clear first so swapping two traits never trips the duplicate check.
    for &slot in &changed {
        plan.ops.push(EditOp::SetTraitSlot { slot, index: None });
    }
    for &slot in &changed {
        if let Some(index) = target[slot] {
            plan.ops.push(EditOp::SetTraitSlot {
                slot,
                index: Some(index),
            });
        }
    }
}

fn plan_perks(model: &Model, submitted: &Projection, plan: &mut EditPlan) {
    let mut wanted: BTreeMap<usize, i32> = BTreeMap::new();
    for perk in &submitted.perks {
        wanted.insert(perk.index, perk.rank);
    }

    for (index, &rank) in model.perk_ranks().iter().enumerate() {
        if rank > 0 && !wanted.contains_key(&index) {
            plan.ops.push(EditOp::ClearPerk(index));
        }
    }
    for (&index, &rank) in &wanted {
        if model.perk_rank(index) == rank {
            continue;
        }
        if rank <= 0 {
            plan.ops.push(EditOp::ClearPerk(index));
        } else {
            plan.ops.push(EditOp::SetPerk(index, rank));
        }
    }
}

fn plan_inventory(current: &Projection, submitted: &Projection, plan: &mut EditPlan) {
    let mut seen: Vec<i32> = Vec::new();
    for entry in &submitted.inventory {
        if seen.contains(&entry.pid) {
            plan.ignore(format!("inventory.{}", entry.pid));
            continue;
        }
        seen.push(entry.pid);

        match current.inventory.iter().find(|line| line.pid == entry.pid) {
            Some(line) if line.quantity == entry.quantity => {}
            Some(_) => plan
                .ops
                .push(EditOp::SetInventoryQuantity(entry.pid, entry.quantity)),
            // Rejected by apply_edits; new PIDs are never fabricated.
            None => plan.ops.push(EditOp::AddInventory(entry.pid, entry.quantity)),
        }
    }

    for line in &current.inventory {
        if !seen.contains(&line.pid) {
            plan.ops.push(EditOp::RemoveInventory(line.pid, None));
        }
    }
}
