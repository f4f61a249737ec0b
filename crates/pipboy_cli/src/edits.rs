//! Turns `--set-*` style flags into edit ops.

use pipboy_core::{EditOp, Gender, ScalarField};

use crate::Cli;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TraitAssignment {
    pub slot: usize,
    pub index: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PerkAssignment {
    pub index: usize,
    pub rank: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ItemQuantity {
    pub pid: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RemoveItem {
    pub pid: i32,
    pub quantity: Option<i32>,
}

/// Ops in application order: scalars, SPECIAL, traits, perks, inventory.
/// Clears run before sets so that swaps between slots succeed.
pub(crate) fn collect(cli: &Cli) -> Vec<EditOp> {
    let mut ops = Vec::new();

    let scalars = [
        (ScalarField::Age, cli.set_age),
        (ScalarField::Level, cli.set_level),
        (ScalarField::Experience, cli.set_xp),
        (ScalarField::SkillPoints, cli.set_skill_points),
        (ScalarField::Karma, cli.set_karma),
        (ScalarField::Reputation, cli.set_reputation),
        (
            ScalarField::Gender,
            cli.set_gender.map(|g| i32::from(Gender::from(g))),
        ),
        (ScalarField::HitPoints, cli.set_hp),
    ];
    for (field, value) in scalars {
        if let Some(value) = value {
            ops.push(EditOp::SetScalar(field, i64::from(value)));
        }
    }

    let special = [
        cli.set_strength,
        cli.set_perception,
        cli.set_endurance,
        cli.set_charisma,
        cli.set_intelligence,
        cli.set_agility,
        cli.set_luck,
    ];
    for (index, value) in special.into_iter().enumerate() {
        if let Some(value) = value {
            ops.push(EditOp::SetAttributeBase(index, value));
        }
    }

    for &slot in &cli.clear_trait {
        ops.push(EditOp::SetTraitSlot { slot, index: None });
    }
    for assignment in &cli.set_trait {
        ops.push(EditOp::SetTraitSlot {
            slot: assignment.slot,
            index: Some(assignment.index),
        });
    }

    for &index in &cli.clear_perk {
        ops.push(EditOp::ClearPerk(index));
    }
    for perk in &cli.set_perk {
        ops.push(EditOp::SetPerk(perk.index, perk.rank));
    }

    for item in &cli.set_item_qty {
        ops.push(EditOp::SetInventoryQuantity(item.pid, item.quantity));
    }
    for item in &cli.add_item {
        ops.push(EditOp::AddInventory(item.pid, item.quantity));
    }
    for item in &cli.remove_item {
        ops.push(EditOp::RemoveInventory(item.pid, item.quantity));
    }

    ops
}

pub(crate) fn parse_trait_assignment(value: &str) -> Result<TraitAssignment, String> {
    let (slot, index) = split_pair(value, "SLOT:INDEX")?;
    Ok(TraitAssignment {
        slot: parse_number(slot, "slot")?,
        index: parse_number(index, "trait index")?,
    })
}

pub(crate) fn parse_perk_assignment(value: &str) -> Result<PerkAssignment, String> {
    let (index, rank) = split_pair(value, "INDEX:RANK")?;
    Ok(PerkAssignment {
        index: parse_number(index, "perk index")?,
        rank: parse_number(rank, "rank")?,
    })
}

pub(crate) fn parse_item_quantity(value: &str) -> Result<ItemQuantity, String> {
    let (pid, quantity) = split_pair(value, "PID:QTY")?;
    Ok(ItemQuantity {
        pid: parse_number(pid, "pid")?,
        quantity: parse_number(quantity, "quantity")?,
    })
}

pub(crate) fn parse_remove_item(value: &str) -> Result<RemoveItem, String> {
    match value.split_once(':') {
        Some((pid, quantity)) => Ok(RemoveItem {
            pid: parse_number(pid, "pid")?,
            quantity: Some(parse_number(quantity, "quantity")?),
        }),
        None => Ok(RemoveItem {
            pid: parse_number(value, "pid")?,
            quantity: None,
        }),
    }
}

fn split_pair<'a>(value: &'a str, shape: &str) -> Result<(&'a str, &'a str), String> {
    value
        .split_once(':')
        .ok_or_else(|| format!("expected {shape}, got '{value}'"))
}

/// Accepts decimal or `0x`-prefixed hex, which is how PIDs are usually
/// written.
fn parse_number<T>(value: &str, what: &str) -> Result<T, String>
where
    T: TryFrom<i64>,
{
    let trimmed = value.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => trimmed.parse::<i64>(),
    }
    .map_err(|e| format!("invalid {what} '{value}': {e}"))?;

    T::try_from(parsed).map_err(|_| format!("{what} {parsed} is out of range"))
}
