use super::*;
use crate::layout::SectionId;
use crate::variant::GameVariant;

pub const PERK_COUNT: usize = 63;
pub const KILL_TYPE_COUNT: usize = 16;

pub const PERK_NAMES: [&str; PERK_COUNT] = [
    "Awareness",
    "Bonus HtH Attacks",
    "Bonus HtH Damage",
    "Bonus Move",
    "Bonus Ranged Damage",
    "Bonus Rate of Fire",
    "Earlier Sequence",
    "Faster Healing",
    "More Criticals",
    "Night Vision",
    "Presence",
    "Rad Resistance",
    "Toughness",
    "Strong Back",
    "Sharpshooter",
    "Silent Running",
    "Survivalist",
    "Master Trader",
    "Educated",
    "Healer",
    "Fortune Finder",
    "Better Criticals",
    "Empathy",
    "Slayer",
    "Sniper",
    "Silent Death",
    "Action Boy",
    "Mental Block",
    "Lifegiver",
    "Dodger",
    "Snakeater",
    "Mr. Fixit",
    "Medic",
    "Master Thief",
    "Speaker",
    "Heave Ho!",
    "Friendly Foe",
    "Pickpocket",
    "Ghost",
    "Cult of Personality",
    "Scrounger",
    "Explorer",
    "Flower Child",
    "Pathfinder",
    "Animal Friend",
    "Scout",
    "Mysterious Stranger",
    "Ranger",
    "Quick Pockets",
    "Smooth Talker",
    "Swift Learner",
    "Tag!",
    "Mutate!",
    // Addictions and item effects share the perk array.
    "Nuka-Cola Addiction",
    "Buffout Addiction",
    "Mentats Addiction",
    "Psycho Addiction",
    "Radaway Addiction",
    "Weapon Long Range",
    "Weapon Accurate",
    "Weapon Penetrate",
    "Weapon Knockback",
    "Powered Armor",
];

pub const KILL_TYPE_NAMES: [&str; KILL_TYPE_COUNT] = [
    "Man",
    "Woman",
    "Child",
    "Super Mutant",
    "Ghoul",
    "Brahmin",
    "Radscorpion",
    "Rat",
    "Floater",
    "Centaur",
    "Robot",
    "Dog",
    "Mantis",
    "Deathclaw",
    "Plant",
    "(Unused)",
];

const SECTION_NAMES: [(u8, &str); 16] = [
    (1, "player combat id"),
    (2, "global variables"),
    (3, "map list"),
    (4, "global variables (copy)"),
    (5, "player object"),
    (6, "critter proto"),
    (7, "kill counts"),
    (8, "tagged skills"),
    (9, "roll"),
    (10, "perks"),
    (11, "combat state"),
    (12, "combat ai"),
    (13, "pc stats"),
    (14, "messages"),
    (15, "event queue"),
    (16, "traits"),
];

const fn formula(
    default_value: i32,
    multiplier: i32,
    stat1: usize,
    stat2: Option<usize>,
    divisor: i32,
) -> SkillFormula {
    SkillFormula {
        default_value,
        multiplier,
        stat1,
        stat2,
        divisor,
    }
}

static SKILL_FORMULAS: [SkillFormula; SKILL_COUNT] = [
    formula(35, 1, STAT_AGILITY, None, 1),
    formula(10, 1, STAT_AGILITY, None, 1),
    formula(10, 1, STAT_AGILITY, None, 1),
    formula(65, 1, STAT_AGILITY, Some(STAT_STRENGTH), 2),
    formula(55, 1, STAT_AGILITY, Some(STAT_STRENGTH), 2),
    formula(40, 1, STAT_AGILITY, None, 1),
    formula(30, 1, STAT_PERCEPTION, Some(STAT_INTELLIGENCE), 2),
    formula(15, 1, STAT_PERCEPTION, Some(STAT_INTELLIGENCE), 2),
    formula(25, 1, STAT_AGILITY, None, 1),
    formula(20, 1, STAT_PERCEPTION, Some(STAT_AGILITY), 2),
    formula(20, 1, STAT_AGILITY, None, 1),
    formula(20, 1, STAT_PERCEPTION, Some(STAT_AGILITY), 2),
    formula(25, 2, STAT_INTELLIGENCE, None, 1),
    formula(20, 1, STAT_INTELLIGENCE, None, 1),
    formula(25, 2, STAT_CHARISMA, None, 1),
    formula(20, 2, STAT_CHARISMA, None, 1),
    formula(20, 3, STAT_LUCK, None, 1),
    formula(5, 1, STAT_ENDURANCE, Some(STAT_INTELLIGENCE), 2),
];

static PERK_SKILL_MODIFIERS: [PerkSkillModifier; 6] = [
    PerkSkillModifier {
        perk: PERK_MEDIC,
        skills: &[SKILL_FIRST_AID, SKILL_DOCTOR],
        amount: 20,
    },
    PerkSkillModifier {
        perk: PERK_MASTER_THIEF,
        skills: &[SKILL_LOCKPICK, SKILL_STEAL],
        amount: 10,
    },
    PerkSkillModifier {
        perk: PERK_MR_FIXIT,
        skills: &[SKILL_SCIENCE, SKILL_REPAIR],
        amount: 20,
    },
    PerkSkillModifier {
        perk: PERK_SPEAKER,
        skills: &[SKILL_SPEECH],
        amount: 20,
    },
    PerkSkillModifier {
        perk: PERK_RANGER,
        skills: &[SKILL_OUTDOORSMAN],
        amount: 15,
    },
    PerkSkillModifier {
        perk: PERK_SURVIVALIST,
        skills: &[SKILL_OUTDOORSMAN],
        amount: 20,
    },
];

pub static TABLES: TableSet = TableSet {
    variant: GameVariant::Fallout1,
    version: [1, 1],
    stat_names: &STAT_NAMES,
    skill_names: &SKILL_NAMES,
    perk_names: &PERK_NAMES,
    trait_names: &TRAIT_NAMES,
    kill_type_names: &KILL_TYPE_NAMES,
    sections: SectionMap {
        player_object: SectionId::Handler(5),
        critter_proto: SectionId::Handler(6),
        kill_counts: SectionId::Handler(7),
        tagged_skills: SectionId::Handler(8),
        perks: SectionId::Handler(10),
        pc_stats: SectionId::Handler(13),
        traits: SectionId::Handler(16),
        preferences: None,
    },
    section_names: &SECTION_NAMES,
    skill_formulas: &SKILL_FORMULAS,
    perk_skill_modifiers: &PERK_SKILL_MODIFIERS,
    difficulty_affects_skills: false,
};
