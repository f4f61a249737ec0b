use std::collections::BTreeSet;

use serde::Serialize;

use crate::decode::decode;
use crate::error::FormatError;
use crate::layout::SectionId;
use crate::model::Model;
use crate::tables::TRAIT_SLOT_COUNT;
use crate::variant::GameVariant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DiffValue {
    Absent,
    Int(i64),
    Text(String),
}

impl From<i32> for DiffValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<Option<i32>> for DiffValue {
    fn from(value: Option<i32>) -> Self {
        value.map_or(Self::Absent, Self::from)
    }
}

impl std::fmt::Display for DiffValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => f.write_str("<absent>"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    pub path: String,
    pub a: DiffValue,
    pub b: DiffValue,
}

/// Decodes both saves and diffs them field by field. Each side is detected
/// independently unless `hint` is given.
pub fn compare(
    a: &[u8],
    b: &[u8],
    hint: Option<GameVariant>,
) -> Result<Vec<FieldDiff>, FormatError> {
    let a = decode(a, hint)?;
    let b = decode(b, hint)?;
    Ok(compare_models(&a, &b))
}

struct Differ {
    diffs: Vec<FieldDiff>,
}

impl Differ {
    fn push(&mut self, path: impl Into<String>, a: DiffValue, b: DiffValue) {
        if a != b {
            self.diffs.push(FieldDiff {
                path: path.into(),
                a,
                b,
            });
        }
    }

    fn int(&mut self, path: impl Into<String>, a: impl Into<DiffValue>, b: impl Into<DiffValue>) {
        self.push(path, a.into(), b.into());
    }

    fn text(&mut self, path: &str, a: impl ToString, b: impl ToString) {
        self.push(
            path,
            DiffValue::Text(a.to_string()),
            DiffValue::Text(b.to_string()),
        );
    }
}

/// Field-level differences in a fixed order: header, scalars, SPECIAL,
/// skills, tags, traits, perks, inventory, kills. Derived totals are left
/// out since they follow from the stored values.
pub fn compare_models(a: &Model, b: &Model) -> Vec<FieldDiff> {
    let mut d = Differ { diffs: Vec::new() };

    d.text("game", a.variant(), b.variant());
    d.text("name", a.name(), b.name());
    d.text("description", a.description(), b.description());
    d.text("map", a.map_filename(), b.map_filename());
    d.int("map_id", i32::from(a.map_id()), i32::from(b.map_id()));
    d.int("elevation", i32::from(a.elevation()), i32::from(b.elevation()));
    d.text("game_date", a.game_date(), b.game_date());
    d.text("save_date", a.save_date(), b.save_date());
    d.push(
        "game_time",
        DiffValue::Int(i64::from(a.game_time())),
        DiffValue::Int(i64::from(b.game_time())),
    );

    d.text("gender", a.gender(), b.gender());
    d.int("age", a.age().total, b.age().total);
    d.int("level", a.level(), b.level());
    d.int("xp", a.experience(), b.experience());
    d.int("skill_points", a.skill_points(), b.skill_points());
    d.int("karma", a.karma(), b.karma());
    d.int("reputation", a.reputation(), b.reputation());
    d.int("hp", a.hit_points(), b.hit_points());

    for (left, right) in a.special().iter().zip(b.special()) {
        d.int(format!("special.{}.base", left.name), left.base, right.base);
        d.int(format!("special.{}.bonus", left.name), left.bonus, right.bonus);
    }
    for (left, right) in a.skills().iter().zip(b.skills()) {
        d.int(format!("skills.{}.raw", left.name), left.raw, right.raw);
    }

    d.text(
        "tagged_skills",
        format!("{:?}", a.tagged_skills()),
        format!("{:?}", b.tagged_skills()),
    );

    for slot in 0..TRAIT_SLOT_COUNT {
        d.int(format!("traits.{slot}"), trait_at(a, slot), trait_at(b, slot));
    }

    let perk_indices: BTreeSet<usize> = a
        .perks()
        .into_iter()
        .chain(b.perks())
        .map(|perk| perk.index)
        .collect();
    for index in perk_indices {
        let rank = |model: &Model| Some(model.perk_rank(index)).filter(|&rank| rank > 0);
        let name = a
            .tables()
            .perk_name(index)
            .map_or_else(|| b.perk_display_name(index), str::to_string);
        d.int(format!("perks.{name}"), rank(a), rank(b));
    }

    let pids: BTreeSet<i32> = a
        .inventory()
        .into_iter()
        .chain(b.inventory())
        .map(|line| line.pid)
        .collect();
    for pid in pids {
        let quantity = |model: &Model| {
            model
                .inventory()
                .into_iter()
                .find(|line| line.pid == pid)
                .map(|line| line.quantity)
        };
        d.int(format!("inventory.{pid}"), quantity(a), quantity(b));
    }

    let (kills_a, kills_b) = (a.kills(), b.kills());
    for index in 0..kills_a.len().max(kills_b.len()) {
        let left = kills_a.get(index);
        let right = kills_b.get(index);
        let Some(name) = left.or(right).map(|kill| kill.name.as_str()) else {
            continue;
        };
        d.int(
            format!("kills.{name}"),
            left.map(|kill| kill.count),
            right.map(|kill| kill.count),
        );
    }

    d.diffs
}

fn trait_at(model: &Model, slot: usize) -> Option<i32> {
    model
        .trait_slots()
        .map(|slots| slots[slot])
        .filter(|&index| index >= 0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionDiff {
    pub id: SectionId,
    pub name: String,
    pub a_len: Option<usize>,
    pub b_len: Option<usize>,
    /// Differing bytes over the common prefix plus the length difference.
    pub differing_bytes: usize,
}

/// Per-section byte differences, matched by section id. Identical sections
/// are omitted.
pub fn compare_sections(a: &Model, b: &Model) -> Vec<SectionDiff> {
    let mut ids: Vec<SectionId> = a.layout.sections.iter().map(|s| s.id).collect();
    for section in &b.layout.sections {
        if !ids.contains(&section.id) {
            ids.push(section.id);
        }
    }

    let mut diffs = Vec::new();
    for id in ids {
        let left = section_bytes(a, id);
        let right = section_bytes(b, id);
        let differing_bytes = match (left, right) {
            (Some(left), Some(right)) => {
                let common = left.iter().zip(right).filter(|(x, y)| x != y).count();
                common + left.len().abs_diff(right.len())
            }
            (Some(bytes), None) | (None, Some(bytes)) => bytes.len(),
            (None, None) => 0,
        };
        if differing_bytes == 0 {
            continue;
        }

        let model = if left.is_some() { a } else { b };
        diffs.push(SectionDiff {
            id,
            name: model.tables().section_name(id).to_string(),
            a_len: left.map(<[u8]>::len),
            b_len: right.map(<[u8]>::len),
            differing_bytes,
        });
    }
    diffs
}

fn section_bytes(model: &Model, id: SectionId) -> Option<&[u8]> {
    let index = model.layout.position(id)?;
    model.blobs.get(index).map(Vec::as_slice)
}
