use super::*;
use crate::layout::SectionId;
use crate::variant::GameVariant;

pub const PERK_COUNT: usize = 119;
pub const KILL_TYPE_COUNT: usize = 19;

pub const PERK_GAMBLER: usize = 84;
pub const PERK_HARMLESS: usize = 92;
pub const PERK_LIVING_ANATOMY: usize = 98;
pub const PERK_NEGOTIATOR: usize = 100;
pub const PERK_SALESMAN: usize = 104;
pub const PERK_THIEF: usize = 106;
pub const PERK_VAULT_CITY_TRAINING: usize = 108;
pub const PERK_EXPERT_EXCREMENT_EXPEDITER: usize = 117;

pub const GAME_DIFFICULTY_EASY: i32 = 0;
pub const GAME_DIFFICULTY_HARD: i32 = 2;

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
    "Combat Armor",
    "Weapon Scope Range",
    "Weapon Fast Reload",
    "Weapon Night Sight",
    "Weapon Flameboy",
    "Armor Advanced I",
    "Armor Advanced II",
    "Jet Addiction",
    "Tragic Addiction",
    "Armor Charisma",
    "Gecko Skinning",
    "Dermal Impact Armor",
    "Dermal Impact Assault Enhancement",
    "Phoenix Armor Implants",
    "Phoenix Assault Enhancement",
    "Vault City Inoculations",
    "Adrenaline Rush",
    "Cautious Nature",
    "Comprehension",
    "Demolition Expert",
    "(Unused)",
    "Gambler",
    "Gain Strength",
    "Gain Perception",
    "Gain Endurance",
    "Gain Charisma",
    "Gain Intelligence",
    "Gain Agility",
    "Gain Luck",
    "Harmless",
    "Here and Now",
    "HtH Evade",
    "Kama Sutra Master",
    "Karma Beacon",
    "Light Step",
    "Living Anatomy",
    "Magnetic Personality",
    "Negotiator",
    "Pack Rat",
    "Pyromaniac",
    "Quick Recovery",
    "Salesman",
    "Stonewall",
    "Thief",
    "Weapon Handling",
    "Vault City Training",
    "Alcohol HP Bonus 1",
    "Alcohol HP Bonus 2",
    "Alcohol HP Neg 1",
    "Alcohol HP Neg 2",
    "Autodoc HP Bonus 1",
    "Autodoc HP Bonus 2",
    "Autodoc HP Neg 1",
    "Autodoc HP Neg 2",
    "Expert Excrement Expediter",
    "Weapon Enhanced Knockout",
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
    "Manti",
    "Deathclaw",
    "Plant",
    "Gecko",
    "Alien",
    "Giant Ant",
    "Big Bad Boss",
];

const SECTION_NAMES: [(u8, &str); 17] = [
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
    (15, "traits"),
    (16, "automap flags"),
    (17, "preferences"),
];

const fn formula(
    default_value: i32,
    multiplier: i32,
    stat1: usize,
    stat2: Option<usize>,
) -> SkillFormula {
    SkillFormula {
        default_value,
        multiplier,
        stat1,
        stat2,
        divisor: 1,
    }
}

static SKILL_FORMULAS: [SkillFormula; SKILL_COUNT] = [
    formula(5, 4, STAT_AGILITY, None),
    formula(0, 2, STAT_AGILITY, None),
    formula(0, 2, STAT_AGILITY, None),
    formula(30, 2, STAT_AGILITY, Some(STAT_STRENGTH)),
    formula(20, 2, STAT_AGILITY, Some(STAT_STRENGTH)),
    formula(0, 4, STAT_AGILITY, None),
    formula(0, 2, STAT_PERCEPTION, Some(STAT_INTELLIGENCE)),
    formula(5, 1, STAT_PERCEPTION, Some(STAT_INTELLIGENCE)),
    formula(5, 3, STAT_AGILITY, None),
    formula(10, 1, STAT_PERCEPTION, Some(STAT_AGILITY)),
    formula(0, 3, STAT_AGILITY, None),
    formula(10, 1, STAT_PERCEPTION, Some(STAT_AGILITY)),
    formula(0, 4, STAT_INTELLIGENCE, None),
    formula(0, 3, STAT_INTELLIGENCE, None),
    formula(0, 5, STAT_CHARISMA, None),
    formula(0, 4, STAT_CHARISMA, None),
    formula(0, 5, STAT_LUCK, None),
    formula(0, 2, STAT_ENDURANCE, Some(STAT_INTELLIGENCE)),
];

// Ghost depends on the light level at the player's tile, which a save
// does not record, so it has no entry.
static PERK_SKILL_MODIFIERS: [PerkSkillModifier; 14] = [
    PerkSkillModifier {
        perk: PERK_MEDIC,
        skills: &[SKILL_FIRST_AID, SKILL_DOCTOR],
        amount: 10,
    },
    PerkSkillModifier {
        perk: PERK_VAULT_CITY_TRAINING,
        skills: &[SKILL_FIRST_AID, SKILL_DOCTOR],
        amount: 5,
    },
    PerkSkillModifier {
        perk: PERK_LIVING_ANATOMY,
        skills: &[SKILL_DOCTOR],
        amount: 10,
    },
    PerkSkillModifier {
        perk: PERK_THIEF,
        skills: &[SKILL_SNEAK, SKILL_LOCKPICK, SKILL_STEAL, SKILL_TRAPS],
        amount: 10,
    },
    PerkSkillModifier {
        perk: PERK_MASTER_THIEF,
        skills: &[SKILL_LOCKPICK, SKILL_STEAL],
        amount: 15,
    },
    PerkSkillModifier {
        perk: PERK_HARMLESS,
        skills: &[SKILL_STEAL],
        amount: 20,
    },
    PerkSkillModifier {
        perk: PERK_MR_FIXIT,
        skills: &[SKILL_SCIENCE, SKILL_REPAIR],
        amount: 10,
    },
    PerkSkillModifier {
        perk: PERK_SPEAKER,
        skills: &[SKILL_SPEECH],
        amount: 20,
    },
    PerkSkillModifier {
        perk: PERK_EXPERT_EXCREMENT_EXPEDITER,
        skills: &[SKILL_SPEECH],
        amount: 5,
    },
    PerkSkillModifier {
        perk: PERK_NEGOTIATOR,
        skills: &[SKILL_SPEECH, SKILL_BARTER],
        amount: 10,
    },
    PerkSkillModifier {
        perk: PERK_SALESMAN,
        skills: &[SKILL_BARTER],
        amount: 20,
    },
    PerkSkillModifier {
        perk: PERK_GAMBLER,
        skills: &[SKILL_GAMBLING],
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
        amount: 25,
    },
];

pub static TABLES: TableSet = TableSet {
    variant: GameVariant::Fallout2,
    version: [1, 2],
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
        traits: SectionId::Handler(15),
        preferences: Some(SectionId::Handler(17)),
    },
    section_names: &SECTION_NAMES,
    skill_formulas: &SKILL_FORMULAS,
    perk_skill_modifiers: &PERK_SKILL_MODIFIERS,
    difficulty_affects_skills: true,
};
