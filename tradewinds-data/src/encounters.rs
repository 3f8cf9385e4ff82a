//! Sea encounter tables.
//!
//! Entries are keyed by water body and frequency class. The engine picks
//! uniformly within a table; everything else about an encounter (distance,
//! surprise, number appearing, classification) is derived from the entry's
//! fields and the name sets below.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterBody {
    Fresh,
    Coastal,
    Shallow,
    Deep,
}

impl std::fmt::Display for WaterBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WaterBody::Fresh => "fresh water",
            WaterBody::Coastal => "coastal water",
            WaterBody::Shallow => "shallow sea",
            WaterBody::Deep => "deep sea",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyClass {
    Common,
    Uncommon,
    Rare,
    VeryRare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
    Gargantuan,
}

/// One row of an encounter table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterEntry {
    pub name: &'static str,
    /// Number-appearing dice expression; "-" means one.
    pub number: &'static str,
    pub size: SizeClass,
    /// Hit dice per creature; zero for hazards and interactive entries.
    pub hit_dice: u32,
    /// Overrides the base 2-in-6 surprise chance when set.
    pub surprise_in_6: Option<u32>,
    /// Large enough to roll the ship over.
    pub capsize: bool,
}

const fn entry(
    name: &'static str,
    number: &'static str,
    size: SizeClass,
    hit_dice: u32,
) -> EncounterEntry {
    EncounterEntry {
        name,
        number,
        size,
        hit_dice,
        surprise_in_6: None,
        capsize: false,
    }
}

const fn sly(
    name: &'static str,
    number: &'static str,
    size: SizeClass,
    hit_dice: u32,
    surprise_in_6: u32,
) -> EncounterEntry {
    EncounterEntry {
        name,
        number,
        size,
        hit_dice,
        surprise_in_6: Some(surprise_in_6),
        capsize: false,
    }
}

const fn titan(name: &'static str, hit_dice: u32) -> EncounterEntry {
    EncounterEntry {
        name,
        number: "-",
        size: SizeClass::Gargantuan,
        hit_dice,
        surprise_in_6: None,
        capsize: true,
    }
}

use SizeClass::{Gargantuan as G, Large as L, Medium as M, Small as S};

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

static FRESH_COMMON: &[EncounterEntry] = &[
    entry("school of fish", "d4x20", S, 0),
    entry("crocodile", "1d6", M, 3),
    entry("giant eel", "1d3", M, 4),
    entry("seaweed bank", "-", L, 0),
    entry("river barge", "-", L, 0),
];

static FRESH_UNCOMMON: &[EncounterEntry] = &[
    entry("giant crab", "1d4", L, 3),
    sly("giant snapping turtle", "1d2", L, 6, 3),
    entry("shoals", "-", L, 0),
    entry("heron flock", "2d6", S, 1),
];

static FRESH_RARE: &[EncounterEntry] = &[
    sly("water naga", "1d2", L, 7, 3),
    entry("marsh troll", "1d4", L, 6),
    entry("whirlpool", "-", L, 0),
    entry("ghost light", "-", S, 0),
];

static FRESH_VERY_RARE: &[EncounterEntry] = &[
    entry("river serpent", "-", G, 10),
    entry("sunken bell omen", "-", S, 0),
];

static COASTAL_COMMON: &[EncounterEntry] = &[
    entry("gull flock", "3d6", S, 1),
    entry("dolphin pod", "2d4", M, 2),
    entry("shark", "3d4", M, 3),
    entry("merchant cog", "-", L, 0),
    entry("reef", "-", L, 0),
];

static COASTAL_UNCOMMON: &[EncounterEntry] = &[
    entry("sea lion", "1d4", L, 5),
    sly("merrow war-band", "2d4", M, 2, 3),
    entry("pirate sloop", "-", L, 6),
    entry("shoals", "-", L, 0),
    entry("uncharted island", "-", G, 0),
];

static COASTAL_RARE: &[EncounterEntry] = &[
    entry("harpy flock", "1d6", M, 2),
    sly("sea troll", "1d4", L, 6, 3),
    entry("giant octopus", "1d2", L, 8),
    entry("seaweed bank", "-", L, 0),
];

static COASTAL_VERY_RARE: &[EncounterEntry] = &[
    entry("siren", "1d3", M, 4),
    entry("sea serpent", "-", G, 10),
    entry("sea omen", "-", S, 0),
];

static SHALLOW_COMMON: &[EncounterEntry] = &[
    entry("shark", "3d4", M, 3),
    entry("school of fish", "d4x20", S, 0),
    entry("hippocampus herd", "2d4", L, 4),
    entry("merchant galley", "-", L, 0),
    entry("shoals", "-", L, 0),
];

static SHALLOW_UNCOMMON: &[EncounterEntry] = &[
    entry("giant shark", "1d3", L, 8),
    entry("giant crab", "2d4", L, 3),
    sly("merrow war-band", "3d4", M, 2, 3),
    entry("seaweed bank", "-", L, 0),
];

static SHALLOW_RARE: &[EncounterEntry] = &[
    entry("giant turtle", "-", G, 9),
    entry("corsair galley", "-", L, 7),
    sly("giant squid", "1d2", L, 12, 4),
    entry("whirlpool", "-", L, 0),
];

static SHALLOW_VERY_RARE: &[EncounterEntry] = &[
    titan("dragon turtle", 14),
    entry("storm roc", "-", G, 18),
    entry("sea omen", "-", S, 0),
];

static DEEP_COMMON: &[EncounterEntry] = &[
    entry("whale", "1d3", G, 12),
    entry("dolphin pod", "2d6", M, 2),
    entry("giant shark", "1d4", L, 8),
    entry("merchant galley", "-", L, 0),
];

static DEEP_UNCOMMON: &[EncounterEntry] = &[
    entry("giant squid", "1d2", L, 12),
    entry("pirate sloop", "-", L, 6),
    entry("sea giant", "1d2", G, 11),
    entry("ice floe", "-", G, 0),
];

static DEEP_RARE: &[EncounterEntry] = &[
    entry("sea serpent", "1d2", G, 10),
    entry("corsair galley", "-", L, 7),
    entry("storm roc", "-", G, 18),
    entry("maelstrom", "-", G, 0),
];

static DEEP_VERY_RARE: &[EncounterEntry] = &[
    sly("kraken", "-", G, 16, 3),
    titan("leviathan", 20),
    entry("ghost ship", "-", L, 0),
];

/// Table lookup for a water body and frequency class. Every combination
/// has at least two entries.
pub fn table(water: WaterBody, class: FrequencyClass) -> &'static [EncounterEntry] {
    use FrequencyClass::*;
    use WaterBody::*;
    match (water, class) {
        (Fresh, Common) => FRESH_COMMON,
        (Fresh, Uncommon) => FRESH_UNCOMMON,
        (Fresh, Rare) => FRESH_RARE,
        (Fresh, VeryRare) => FRESH_VERY_RARE,
        (Coastal, Common) => COASTAL_COMMON,
        (Coastal, Uncommon) => COASTAL_UNCOMMON,
        (Coastal, Rare) => COASTAL_RARE,
        (Coastal, VeryRare) => COASTAL_VERY_RARE,
        (Shallow, Common) => SHALLOW_COMMON,
        (Shallow, Uncommon) => SHALLOW_UNCOMMON,
        (Shallow, Rare) => SHALLOW_RARE,
        (Shallow, VeryRare) => SHALLOW_VERY_RARE,
        (Deep, Common) => DEEP_COMMON,
        (Deep, Uncommon) => DEEP_UNCOMMON,
        (Deep, Rare) => DEEP_RARE,
        (Deep, VeryRare) => DEEP_VERY_RARE,
    }
}

// ---------------------------------------------------------------------------
// Name sets
// ---------------------------------------------------------------------------

/// Creatures that approach from below and surface close aboard.
static SUBMERGERS: &[&str] = &[
    "crocodile",
    "giant eel",
    "giant crab",
    "giant snapping turtle",
    "water naga",
    "river serpent",
    "shark",
    "giant shark",
    "giant octopus",
    "giant squid",
    "giant turtle",
    "sea serpent",
    "whale",
    "merrow war-band",
    "sea troll",
    "marsh troll",
    "kraken",
    "leviathan",
    "dragon turtle",
];

/// Beasts without the wit to be bargained with or frightened by numbers.
static UNINTELLIGENT: &[&str] = &[
    "school of fish",
    "crocodile",
    "giant eel",
    "giant crab",
    "giant snapping turtle",
    "shark",
    "giant shark",
    "giant octopus",
    "giant squid",
    "giant turtle",
    "sea serpent",
    "river serpent",
    "whale",
    "sea lion",
    "gull flock",
    "heron flock",
    "hippocampus herd",
];

/// Always hostile to shipping, whatever their size.
static SHIP_THREATS: &[&str] = &[
    "pirate sloop",
    "corsair galley",
    "merrow war-band",
    "sea troll",
    "marsh troll",
    "sea giant",
    "harpy flock",
    "siren",
    "sea serpent",
    "river serpent",
    "storm roc",
    "kraken",
    "leviathan",
    "dragon turtle",
];

/// Navigational hazards rather than creatures.
static HAZARDS: &[&str] = &[
    "seaweed bank",
    "shoals",
    "whirlpool",
    "maelstrom",
    "ice floe",
    "reef",
];

/// Worth hailing or noting in the log, never hostile.
static INTERACTIVE: &[&str] = &[
    "merchant cog",
    "merchant galley",
    "river barge",
    "uncharted island",
    "sea omen",
    "sunken bell omen",
    "ghost light",
    "ghost ship",
];

pub fn is_submerger(name: &str) -> bool {
    SUBMERGERS.contains(&name)
}

pub fn is_unintelligent(name: &str) -> bool {
    UNINTELLIGENT.contains(&name)
}

pub fn is_explicit_threat(name: &str) -> bool {
    SHIP_THREATS.contains(&name)
}

pub fn is_hazard(name: &str) -> bool {
    HAZARDS.contains(&name)
}

pub fn is_interactive(name: &str) -> bool {
    INTERACTIVE.contains(&name)
}

/// Boarders climb the freeboard and fight the crew hand to hand.
pub fn is_boarder(name: &str) -> bool {
    ["merrow", "scrag", "ogre", "troll", "giant"]
        .iter()
        .any(|kin| name.contains(kin))
        && !is_unintelligent(name)
}

pub fn is_pirate(name: &str) -> bool {
    name.contains("pirate") || name.contains("corsair")
}

pub fn is_aerial(name: &str) -> bool {
    ["harpy", "roc", "gull", "heron"].iter().any(|kin| name.contains(kin))
}
