//! Optional item names and weights for inventory display.
//!
//! The save only stores PIDs. Names live in the game's proto and message
//! files, so the projection takes an [`ItemLookup`] instead of depending on
//! them. [`WellKnownItems`] covers the PIDs the engine itself refers to.

use serde::Serialize;

use crate::variant::GameVariant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemInfo {
    pub name: String,
    /// Pounds; zero for weightless or unknown.
    pub weight: i32,
}

pub trait ItemLookup {
    fn lookup(&self, pid: i32) -> Option<ItemInfo>;
}

/// Resolves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoItems;

impl ItemLookup for NoItems {
    fn lookup(&self, _pid: i32) -> Option<ItemInfo> {
        None
    }
}

impl<F> ItemLookup for F
where
    F: Fn(i32) -> Option<ItemInfo>,
{
    fn lookup(&self, pid: i32) -> Option<ItemInfo> {
        self(pid)
    }
}

/// (pid, name, weight) for items shared by both games.
#[rustfmt::skip]
const SHARED_ITEMS: &[(i32, &str, i32)] = &[
    (3,   "Power Armor",          60),
    (38,  "Small Energy Cell",    0),
    (39,  "Micro Fusion Cell",    0),
    (40,  "Stimpak",              1),
    (41,  "Bottle Caps",          0),
    (47,  "First Aid Kit",        5),
    (48,  "RadAway",              1),
    (51,  "Dynamite",             3),
    (52,  "Geiger Counter",       3),
    (53,  "Mentats",              1),
    (54,  "Stealth Boy",          3),
    (59,  "Motion Sensor",        5),
    (73,  "Big Book of Science",  3),
    (76,  "Dean's Electronics",   3),
    (79,  "Flare",                1),
    (80,  "First Aid Book",       3),
    (85,  "Plastic Explosives",   3),
    (86,  "Scout Handbook",       3),
    (87,  "Buffout",              1),
    (91,  "Doctor's Bag",         5),
    (102, "Guns and Bullets",     3),
    (106, "Nuka-Cola",            1),
    (110, "Psycho",               1),
    (124, "Beer",                 1),
    (125, "Booze",                1),
    (144, "Super Stimpak",        1),
    (159, "Molotov Cocktail",     1),
    // Lit, armed and active variants of the items above.
    (205, "Flare",                1),
    (206, "Dynamite",             3),
    (207, "Geiger Counter",       3),
    (209, "Plastic Explosives",   3),
    (210, "Stealth Boy",          3),
    (232, "Hardened Power Armor", 60),
];

#[rustfmt::skip]
const FALLOUT2_ITEMS: &[(i32, &str, i32)] = &[
    (259, "Jet",                        1),
    (260, "Jet Antidote",               1),
    (273, "Healing Powder",             2),
    (304, "Deck of Tragic Cards",       0),
    (331, "Cat's Paw Issue #5",         1),
    (348, "Advanced Power Armor",       60),
    (349, "Advanced Power Armor Mk II", 55),
    (383, "Shiv",                       1),
    (390, "Solar Scorcher",             4),
    (399, "Super Cattle Prod",          5),
    (407, "Mega Power Fist",            5),
    (408, "Field Medic First Aid Kit",  5),
    (409, "Paramedic's Bag",            5),
    (433, "Mirrored Shades",            1),
    (499, "PIPBoy Lingual Enhancer",    0),
    (516, "PIPBoy Medical Enhancer",    0),
];

#[derive(Debug, Clone, Copy)]
pub struct WellKnownItems {
    variant: GameVariant,
}

impl WellKnownItems {
    pub fn new(variant: GameVariant) -> Self {
        Self { variant }
    }
}

impl ItemLookup for WellKnownItems {
    fn lookup(&self, pid: i32) -> Option<ItemInfo> {
        let extra: &[(i32, &str, i32)] = match self.variant {
            GameVariant::Fallout1 => &[],
            GameVariant::Fallout2 => FALLOUT2_ITEMS,
        };
        SHARED_ITEMS
            .iter()
            .chain(extra)
            .find(|(item_pid, _, _)| *item_pid == pid)
            .map(|&(_, name, weight)| ItemInfo {
                name: name.to_string(),
                weight,
            })
    }
}
