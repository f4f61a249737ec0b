use clap::Args;
use pipboy_core::Model;
use pipboy_core::items::ItemLookup;
use pipboy_core::tables::STAT_MAX_HP;
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

/// Field flags. Output follows declaration order, not command-line order.
#[derive(Debug, Default, Clone, Copy, Args)]
pub(crate) struct FieldSelection {
    #[arg(long)]
    name: bool,
    #[arg(long)]
    description: bool,
    #[arg(long)]
    gender: bool,
    #[arg(long)]
    age: bool,
    #[arg(long)]
    level: bool,
    #[arg(long)]
    xp: bool,
    #[arg(long)]
    karma: bool,
    #[arg(long)]
    reputation: bool,
    #[arg(long = "skill-points")]
    skill_points: bool,
    #[arg(long)]
    map: bool,
    #[arg(long)]
    elevation: bool,
    #[arg(long = "game-date")]
    game_date: bool,
    #[arg(long = "save-date")]
    save_date: bool,
    #[arg(long = "game-time")]
    game_time: bool,
    #[arg(long)]
    traits: bool,
    #[arg(long)]
    hp: bool,
    #[arg(long = "max-hp")]
    max_hp: bool,
    #[arg(long = "next-level-xp")]
    next_level_xp: bool,
    #[arg(long)]
    special: bool,
    #[arg(long = "derived-stats")]
    derived_stats: bool,
    #[arg(long)]
    skills: bool,
    #[arg(long)]
    perks: bool,
    #[arg(long)]
    kills: bool,
    #[arg(long)]
    inventory: bool,
}

impl FieldSelection {
    /// What a bare `pipboy SAVE.DAT` prints.
    pub(crate) fn summary() -> Self {
        Self {
            name: true,
            description: true,
            gender: true,
            age: true,
            level: true,
            xp: true,
            karma: true,
            reputation: true,
            skill_points: true,
            map: true,
            elevation: true,
            game_date: true,
            save_date: true,
            game_time: true,
            traits: true,
            hp: true,
            max_hp: true,
            next_level_xp: true,
            special: true,
            perks: true,
            ..Self::default()
        }
    }

    pub(crate) fn is_field_mode(&self) -> bool {
        self.name
            || self.description
            || self.gender
            || self.age
            || self.level
            || self.xp
            || self.karma
            || self.reputation
            || self.skill_points
            || self.map
            || self.elevation
            || self.game_date
            || self.save_date
            || self.game_time
            || self.traits
            || self.hp
            || self.max_hp
            || self.next_level_xp
            || self.special
            || self.derived_stats
            || self.skills
            || self.perks
            || self.kills
            || self.inventory
    }

    pub(crate) fn selected_pairs(
        &self,
        model: &Model,
        items: &dyn ItemLookup,
    ) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();

        if self.name {
            out.push(("name", model.name().to_string()));
        }
        if self.description {
            out.push(("description", model.description().to_string()));
        }
        if self.gender {
            out.push(("gender", model.gender().to_string()));
        }
        if self.age {
            out.push(("age", model.age().total.to_string()));
        }
        if self.level {
            out.push(("level", model.level().to_string()));
        }
        if self.xp {
            out.push(("xp", model.experience().to_string()));
        }
        if self.karma {
            out.push(("karma", model.karma().to_string()));
        }
        if self.reputation {
            out.push(("reputation", model.reputation().to_string()));
        }
        if self.skill_points {
            out.push(("skill_points", model.skill_points().to_string()));
        }
        if self.map {
            out.push(("map", model.map_filename().to_string()));
        }
        if self.elevation {
            out.push(("elevation", model.elevation().to_string()));
        }
        if self.game_date {
            out.push(("game_date", model.game_date().to_string()));
        }
        if self.save_date {
            out.push(("save_date", model.save_date().to_string()));
        }
        if self.game_time {
            out.push(("game_time", format_game_time(model.game_time())));
        }
        if self.traits {
            out.push(("traits", format_traits(model)));
        }
        if self.hp {
            out.push((
                "hp",
                model
                    .hit_points()
                    .map_or_else(|| "unknown".to_string(), |hp| hp.to_string()),
            ));
        }
        if self.max_hp {
            out.push(("max_hp", max_hp(model).to_string()));
        }
        if self.next_level_xp {
            out.push(("next_level_xp", model.next_level_xp().to_string()));
        }
        if self.special {
            for stat in model.special() {
                out.push(("special", format!("{}={}", stat.name, stat.total)));
            }
        }
        if self.derived_stats {
            for stat in model.derived_stats() {
                out.push(("derived_stat", format!("{}={}", stat.name, stat.value)));
            }
        }
        if self.skills {
            for skill in model.skills() {
                let tag = if model.is_skill_tagged(skill.index) {
                    " [Tagged]"
                } else {
                    ""
                };
                out.push(("skill", format!("{}={}{tag}", skill.name, skill.total)));
            }
        }
        if self.perks {
            for perk in model.perks() {
                out.push(("perk", format!("{}={}", perk.name, perk.rank)));
            }
        }
        if self.kills {
            for kill in model.kills().into_iter().filter(|k| k.count != 0) {
                out.push(("kill", format!("{}={}", kill.name, kill.count)));
            }
        }
        if self.inventory {
            for line in model.inventory() {
                let mut value = format!("{}x pid={}", line.quantity, line.pid);
                if let Some(info) = items.lookup(line.pid) {
                    value.push_str(&format!(" ({})", info.name));
                }
                out.push(("inventory", value));
            }
        }

        out
    }

    pub(crate) fn selected_json(
        &self,
        model: &Model,
        items: &dyn ItemLookup,
    ) -> JsonMap<String, JsonValue> {
        let mut out = JsonMap::new();

        if self.name {
            out.insert("name".into(), JsonValue::from(model.name()));
        }
        if self.description {
            out.insert("description".into(), JsonValue::from(model.description()));
        }
        if self.gender {
            out.insert("gender".into(), to_json(model.gender()));
        }
        if self.age {
            out.insert("age".into(), JsonValue::from(model.age().total));
        }
        if self.level {
            out.insert("level".into(), JsonValue::from(model.level()));
        }
        if self.xp {
            out.insert("xp".into(), JsonValue::from(model.experience()));
        }
        if self.karma {
            out.insert("karma".into(), JsonValue::from(model.karma()));
        }
        if self.reputation {
            out.insert("reputation".into(), JsonValue::from(model.reputation()));
        }
        if self.skill_points {
            out.insert("skill_points".into(), JsonValue::from(model.skill_points()));
        }
        if self.map {
            out.insert("map".into(), JsonValue::from(model.map_filename()));
        }
        if self.elevation {
            out.insert("elevation".into(), JsonValue::from(model.elevation()));
        }
        if self.game_date {
            out.insert("game_date".into(), to_json(model.game_date()));
        }
        if self.save_date {
            out.insert("save_date".into(), to_json(model.save_date()));
        }
        if self.game_time {
            out.insert("game_time".into(), JsonValue::from(model.game_time()));
        }
        if self.traits {
            let names: Vec<JsonValue> = model
                .traits()
                .iter()
                .map(|t| match t.name {
                    Some(name) => JsonValue::from(name),
                    None => JsonValue::from(t.index),
                })
                .collect();
            out.insert("traits".into(), JsonValue::Array(names));
        }
        if self.hp {
            out.insert("hp".into(), to_json(model.hit_points()));
        }
        if self.max_hp {
            out.insert("max_hp".into(), JsonValue::from(max_hp(model)));
        }
        if self.next_level_xp {
            out.insert("next_level_xp".into(), JsonValue::from(model.next_level_xp()));
        }
        if self.special {
            out.insert("special".into(), to_json(model.special()));
        }
        if self.derived_stats {
            out.insert("derived_stats".into(), to_json(model.derived_stats()));
        }
        if self.skills {
            out.insert("skills".into(), to_json(model.skills()));
        }
        if self.perks {
            out.insert("perks".into(), to_json(model.perks()));
        }
        if self.kills {
            out.insert("kill_counts".into(), to_json(model.kills()));
        }
        if self.inventory {
            let lines: Vec<JsonValue> = model
                .inventory()
                .iter()
                .map(|line| {
                    let mut entry = JsonMap::new();
                    entry.insert("pid".into(), JsonValue::from(line.pid));
                    entry.insert("quantity".into(), JsonValue::from(line.quantity));
                    if let Some(info) = items.lookup(line.pid) {
                        entry.insert("name".into(), JsonValue::from(info.name));
                    }
                    JsonValue::Object(entry)
                })
                .collect();
            out.insert("inventory".into(), JsonValue::Array(lines));
        }

        out
    }
}

fn to_json<T: Serialize>(value: T) -> JsonValue {
    // Model types serialize as plain structs and strings.
    serde_json::to_value(value).unwrap_or(JsonValue::Null)
}

fn max_hp(model: &Model) -> i32 {
    model.proto().total_stat(STAT_MAX_HP)
}

fn format_traits(model: &Model) -> String {
    let traits = model.traits();
    if traits.is_empty() {
        return "none".to_string();
    }
    traits
        .iter()
        .map(|t| {
            t.name
                .map_or_else(|| format!("Unknown ({})", t.index), str::to_string)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Game ticks are tenths of a second; shown as a 24-hour `HHMM` clock.
fn format_game_time(game_time: u32) -> String {
    let hours = (game_time / 600) % 24;
    let minutes = (game_time / 10) % 60;
    format!("{hours:02}{minutes:02}")
}
