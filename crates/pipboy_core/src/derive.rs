//! Derived values: SPECIAL totals, skill values, age and the combat stats
//! shown on the character screen. Everything here is a pure function of the
//! stored fields and uses integer arithmetic only.

use crate::model::{AgeValue, AttributeValue, DerivedStat, Model, SkillValue};
use crate::tables::fallout2::{GAME_DIFFICULTY_EASY, GAME_DIFFICULTY_HARD};
use crate::tables::{
    GAME_TIME_TICKS_PER_YEAR, PERK_TAG, SAVEABLE_STAT_COUNT, SKILL_BARTER, SKILL_CAP,
    SKILL_COUNT, SKILL_DOCTOR, SKILL_FIRST_AID, SKILL_OUTDOORSMAN, SKILL_SPEECH, SKILL_THROWING,
    SPECIAL_COUNT, STAT_AGE, STAT_AGILITY, STAT_ARMOR_CLASS, STAT_CARRY_WEIGHT,
    STAT_CRITICAL_CHANCE, STAT_ENDURANCE, STAT_HEALING_RATE, STAT_LUCK, STAT_MAX_AP, STAT_MAX_HP,
    STAT_MELEE_DAMAGE, STAT_PERCEPTION, STAT_POISON_RESISTANCE, STAT_RADIATION_RESISTANCE,
    STAT_SEQUENCE, STAT_STRENGTH, TAGGED_SKILL_COUNT, TRAIT_GIFTED, TRAIT_GOOD_NATURED,
    TRAIT_SLOT_COUNT, TableSet,
};

const TAG_SKILL_BONUS: i64 = 20;
const GIFTED_SKILL_PENALTY: i64 = -10;
const GOOD_NATURED_COMBAT_PENALTY: i64 = -10;
const GOOD_NATURED_SOCIAL_BONUS: i64 = 15;
const HARD_DIFFICULTY_MODIFIER: i64 = -10;
const EASY_DIFFICULTY_MODIFIER: i64 = 20;

/// First and last proto stat listed as a derived stat.
const DERIVED_STAT_RANGE: std::ops::RangeInclusive<usize> = STAT_MAX_HP..=STAT_POISON_RESISTANCE;

#[derive(Debug, Clone, Default)]
pub struct DerivedView {
    pub special: Vec<AttributeValue>,
    pub skills: Vec<SkillValue>,
    pub age: AgeValue,
    pub derived_stats: Vec<DerivedStat>,
    pub next_level_xp: i64,
}

pub fn compute(model: &Model) -> DerivedView {
    let tables = model.tables();
    let proto = model.proto();

    let special = (0..SPECIAL_COUNT)
        .map(|index| AttributeValue {
            index,
            name: stat_label(tables, index),
            base: proto.base_stats[index],
            bonus: proto.bonus_stats[index],
            total: proto.total_stat(index),
        })
        .collect();

    let inputs = SkillInputs {
        tables,
        special: special_totals(&proto.base_stats, &proto.bonus_stats),
        raw: proto.skills,
        tagged: model.tagged_skill_slots(),
        perks: model.perk_ranks(),
        traits: model.trait_slots(),
        difficulty: model.game_difficulty(),
    };
    let skills = (0..SKILL_COUNT).map(|index| inputs.skill(index)).collect();

    let age_base = proto.base_stats[STAT_AGE];
    let age_bonus = proto.bonus_stats[STAT_AGE];
    let age = AgeValue {
        base: age_base,
        bonus: age_bonus,
        elapsed_years: elapsed_years(model.game_time()),
        total: age_total(age_base, age_bonus, model.game_time()),
    };

    let mut derived_stats: Vec<DerivedStat> = DERIVED_STAT_RANGE
        .map(|index| DerivedStat {
            name: stat_label(tables, index),
            value: proto.total_stat(index),
            max: None,
        })
        .collect();
    if let Some(hp) = model.hit_points() {
        derived_stats.push(DerivedStat {
            name: "Hit Points".to_string(),
            value: hp,
            max: Some(proto.total_stat(STAT_MAX_HP)),
        });
    }
    derived_stats.push(DerivedStat {
        name: "Age".to_string(),
        value: age.total,
        max: None,
    });

    DerivedView {
        special,
        skills,
        age,
        derived_stats,
        next_level_xp: next_level_xp(model.level()),
    }
}

fn stat_label(tables: &TableSet, index: usize) -> String {
    tables
        .stat_name(index)
        .map_or_else(|| format!("Stat {index}"), str::to_string)
}

pub fn special_totals(
    base: &[i32; SAVEABLE_STAT_COUNT],
    bonus: &[i32; SAVEABLE_STAT_COUNT],
) -> [i32; SPECIAL_COUNT] {
    std::array::from_fn(|i| base[i].saturating_add(bonus[i]))
}

/// Whole in-game years since the start of the game.
pub fn elapsed_years(game_time: u32) -> i32 {
    i32::try_from(game_time / GAME_TIME_TICKS_PER_YEAR).unwrap_or(i32::MAX)
}

pub fn age_total(base: i32, bonus: i32, game_time: u32) -> i32 {
    base.saturating_add(bonus)
        .saturating_add(elapsed_years(game_time))
}

/// The stored base that displays as `total`. `None` when the subtraction
/// overflows.
pub fn editable_age_base(total: i32, bonus: i32, game_time: u32) -> Option<i32> {
    total
        .checked_sub(bonus)?
        .checked_sub(elapsed_years(game_time))
}

/// Experience needed for the level after `level`.
pub fn next_level_xp(level: i32) -> i64 {
    let level = i64::from(level);
    (level + 1) * level / 2 * 1000
}

/// Everything a skill value depends on.
#[derive(Debug, Clone)]
pub struct SkillInputs<'a> {
    pub tables: &'static TableSet,
    pub special: [i32; SPECIAL_COUNT],
    pub raw: [i32; SKILL_COUNT],
    pub tagged: [i32; TAGGED_SKILL_COUNT],
    pub perks: &'a [i32],
    pub traits: Option<[i32; TRAIT_SLOT_COUNT]>,
    pub difficulty: Option<i32>,
}

impl SkillInputs<'_> {
    /// `total = min(raw + tag_bonus + bonus, 300)`.
    pub fn skill(&self, index: usize) -> SkillValue {
        let raw = self.raw.get(index).copied().unwrap_or(0);
        let tag_bonus = self.tag_bonus(index, raw);
        let bonus = self.attribute_contribution(index)
            + self.trait_modifier(index)
            + i64::from(self.perk_modifier(index))
            + self.difficulty_modifier(index);
        let total = (i64::from(raw) + tag_bonus + bonus).min(i64::from(SKILL_CAP));

        SkillValue {
            index,
            name: self
                .tables
                .skill_name(index)
                .map_or_else(|| format!("Skill {index}"), str::to_string),
            raw,
            tag_bonus: clamp_i32(tag_bonus),
            bonus: clamp_i32(bonus),
            total: clamp_i32(total),
        }
    }

    fn is_tagged(&self, index: usize) -> bool {
        self.tagged
            .iter()
            .any(|&slot| usize::try_from(slot).is_ok_and(|s| s == index))
    }

    fn has_perk(&self, perk: usize) -> bool {
        self.perks.get(perk).copied().unwrap_or(0) > 0
    }

    fn has_trait(&self, value: i32) -> bool {
        self.traits.is_some_and(|slots| slots.contains(&value))
    }

    fn tag_bonus(&self, index: usize, raw: i32) -> i64 {
        if !self.is_tagged(index) {
            return 0;
        }
        // With Tag! the fourth tag only doubles the raw value.
        let fourth_slot = usize::try_from(self.tagged[TAGGED_SKILL_COUNT - 1]).ok();
        if self.has_perk(PERK_TAG) && fourth_slot == Some(index) {
            i64::from(raw)
        } else {
            i64::from(raw) + TAG_SKILL_BONUS
        }
    }

    fn attribute_contribution(&self, index: usize) -> i64 {
        let Some(formula) = self.tables.skill_formulas.get(index) else {
            return 0;
        };
        let stat = |i: usize| i64::from(self.special.get(i).copied().unwrap_or(0));
        let mut stats = stat(formula.stat1);
        if let Some(stat2) = formula.stat2 {
            stats += stat(stat2);
        }
        let scaled = (i64::from(formula.multiplier) * stats)
            .checked_div(i64::from(formula.divisor))
            .unwrap_or(0);
        i64::from(formula.default_value) + scaled
    }

    fn trait_modifier(&self, index: usize) -> i64 {
        let mut modifier = 0;
        if self.has_trait(TRAIT_GIFTED) {
            modifier += GIFTED_SKILL_PENALTY;
        }
        if self.has_trait(TRAIT_GOOD_NATURED) {
            match index {
                0..=SKILL_THROWING => modifier += GOOD_NATURED_COMBAT_PENALTY,
                SKILL_FIRST_AID | SKILL_DOCTOR | SKILL_SPEECH | SKILL_BARTER => {
                    modifier += GOOD_NATURED_SOCIAL_BONUS;
                }
                _ => {}
            }
        }
        modifier
    }

    fn perk_modifier(&self, index: usize) -> i32 {
        self.tables
            .perk_skill_modifier(index, |perk| self.has_perk(perk))
    }

    fn difficulty_modifier(&self, index: usize) -> i64 {
        if !self.tables.difficulty_affects_skills
            || !(SKILL_FIRST_AID..=SKILL_OUTDOORSMAN).contains(&index)
        {
            return 0;
        }
        match self.difficulty {
            Some(GAME_DIFFICULTY_HARD) => HARD_DIFFICULTY_MODIFIER,
            Some(GAME_DIFFICULTY_EASY) => EASY_DIFFICULTY_MODIFIER,
            _ => 0,
        }
    }
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX))).unwrap_or_default()
}

/// A derived stat whose stored base should follow from SPECIAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaReference {
    pub stat: usize,
    pub expected: i64,
}

/// Character-creation formulas for the derived stats, from SPECIAL totals.
/// Used to flag stored bases that drifted from their attributes.
pub fn formula_references(special: &[i32; SPECIAL_COUNT]) -> Vec<FormulaReference> {
    let s = |i: usize| i64::from(special[i]);
    let (st, pe, en, ag, lk) = (
        s(STAT_STRENGTH),
        s(STAT_PERCEPTION),
        s(STAT_ENDURANCE),
        s(STAT_AGILITY),
        s(STAT_LUCK),
    );

    [
        (STAT_MAX_HP, st + 2 * en + 15),
        (STAT_MAX_AP, ag / 2 + 5),
        (STAT_ARMOR_CLASS, ag),
        (STAT_MELEE_DAMAGE, (st - 5).max(1)),
        (STAT_CARRY_WEIGHT, 25 * st + 25),
        (STAT_SEQUENCE, 2 * pe),
        (STAT_HEALING_RATE, (en / 3).max(1)),
        (STAT_CRITICAL_CHANCE, lk),
        (STAT_RADIATION_RESISTANCE, 2 * en),
        (STAT_POISON_RESISTANCE, 5 * en),
    ]
    .into_iter()
    .map(|(stat, expected)| FormulaReference { stat, expected })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{SKILL_SMALL_GUNS, SKILL_UNARMED};
    use crate::variant::GameVariant;

    fn inputs(variant: GameVariant) -> SkillInputs<'static> {
        SkillInputs {
            tables: variant.tables(),
            special: [5; SPECIAL_COUNT],
            raw: [0; SKILL_COUNT],
            tagged: [-1; TAGGED_SKILL_COUNT],
            perks: &[],
            traits: Some([-1, -1]),
            difficulty: Some(1),
        }
    }

    #[test]
    fn tagged_skill_doubles_raw_and_adds_twenty() {
        let mut inputs = inputs(GameVariant::Fallout2);
        inputs.raw[SKILL_SMALL_GUNS] = 10;
        inputs.tagged = [SKILL_SMALL_GUNS as i32, -1, -1, -1];

        let skill = inputs.skill(SKILL_SMALL_GUNS);
        assert_eq!(skill.bonus, 25);
        assert_eq!(skill.tag_bonus, 30);
        assert_eq!(skill.total, 65);
        assert_eq!(skill.total, skill.raw + skill.tag_bonus + skill.bonus);
    }

    #[test]
    fn tag_perk_fourth_slot_skips_flat_bonus() {
        static PERKS: [i32; 119] = {
            let mut perks = [0; 119];
            perks[PERK_TAG] = 1;
            perks
        };
        let mut inputs = inputs(GameVariant::Fallout2);
        inputs.perks = &PERKS;
        inputs.raw[SKILL_SMALL_GUNS] = 7;
        inputs.tagged = [1, 2, 3, SKILL_SMALL_GUNS as i32];

        assert_eq!(inputs.skill(SKILL_SMALL_GUNS).tag_bonus, 7);
        assert_eq!(inputs.skill(1).tag_bonus, 20);
    }

    #[test]
    fn traits_and_difficulty_adjust_bonus() {
        let mut inputs = inputs(GameVariant::Fallout2);
        inputs.traits = Some([TRAIT_GIFTED, TRAIT_GOOD_NATURED]);
        inputs.difficulty = Some(GAME_DIFFICULTY_HARD);

        // 5 + 4*AG - 10 - 10; combat skills ignore difficulty.
        assert_eq!(inputs.skill(SKILL_SMALL_GUNS).bonus, 5);
        // 2*(PE+IN) - 10 + 15 - 10.
        assert_eq!(inputs.skill(SKILL_FIRST_AID).bonus, 15);

        inputs.difficulty = Some(GAME_DIFFICULTY_EASY);
        assert_eq!(inputs.skill(SKILL_FIRST_AID).bonus, 45);
    }

    #[test]
    fn fallout1_uses_its_own_formulas_without_difficulty() {
        let mut inputs = inputs(GameVariant::Fallout1);
        inputs.difficulty = Some(GAME_DIFFICULTY_HARD);

        assert_eq!(inputs.skill(SKILL_SMALL_GUNS).bonus, 40);
        assert_eq!(inputs.skill(SKILL_UNARMED).bonus, 70);
        assert_eq!(inputs.skill(SKILL_FIRST_AID).bonus, 35);
    }

    #[test]
    fn skill_total_is_capped() {
        let mut inputs = inputs(GameVariant::Fallout2);
        inputs.raw[SKILL_SMALL_GUNS] = 290;
        inputs.tagged = [SKILL_SMALL_GUNS as i32, -1, -1, -1];

        let skill = inputs.skill(SKILL_SMALL_GUNS);
        assert_eq!(skill.total, SKILL_CAP);
        assert_eq!(skill.tag_bonus, 310);
    }

    #[test]
    fn age_base_inverts_forward_formula() {
        let game_time = GAME_TIME_TICKS_PER_YEAR * 3 - 1;
        assert_eq!(elapsed_years(game_time), 2);

        for (total, bonus) in [(25, 0), (40, -2), (1, 3), (i32::MAX - 5, 0)] {
            let base = editable_age_base(total, bonus, game_time).expect("no overflow");
            assert_eq!(age_total(base, bonus, game_time), total);
        }
        assert_eq!(editable_age_base(i32::MIN, 1, 0), None);
    }

    #[test]
    fn next_level_thresholds() {
        assert_eq!(next_level_xp(1), 1_000);
        assert_eq!(next_level_xp(4), 10_000);
        assert_eq!(next_level_xp(99), 4_950_000);
    }

    #[test]
    fn formula_references_follow_special() {
        let refs = formula_references(&[6, 8, 4, 2, 9, 9, 9]);
        let expected = |stat| {
            refs.iter()
                .find(|r| r.stat == stat)
                .map(|r| r.expected)
                .expect("stat listed")
        };
        assert_eq!(expected(STAT_MAX_HP), 29);
        assert_eq!(expected(STAT_MAX_AP), 9);
        assert_eq!(expected(STAT_CARRY_WEIGHT), 175);
        assert_eq!(expected(STAT_HEALING_RATE), 1);
        assert_eq!(expected(STAT_MELEE_DAMAGE), 1);
        assert_eq!(expected(STAT_SEQUENCE), 16);
    }
}
