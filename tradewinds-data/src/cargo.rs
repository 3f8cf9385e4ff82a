//! Cargo categories and the market lookup tables.
//!
//! A load is a half-ton unit; base values are gp per load. The 3d6
//! determination ranges, the sale-adjustment percentages, and the demand
//! modifiers are fixed rulebook tables; the market module composes them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CargoCategory {
    Primitive,
    Consumer,
    Comfort,
    Fine,
    Precious,
}

impl CargoCategory {
    /// Base value, gp per load.
    pub fn base_value(&self) -> u32 {
        match self {
            CargoCategory::Primitive => 50,
            CargoCategory::Consumer => 150,
            CargoCategory::Comfort => 300,
            CargoCategory::Fine => 600,
            CargoCategory::Precious => 1500,
        }
    }

    /// Map an adjusted 3d6 determination roll to a category. Callers clamp
    /// the roll to [3, 20] first; out-of-range values are clamped here too.
    pub fn from_determination_roll(roll: i32) -> Self {
        match roll.clamp(3, 20) {
            3..=7 => CargoCategory::Primitive,
            8..=11 => CargoCategory::Consumer,
            12..=15 => CargoCategory::Comfort,
            16..=17 => CargoCategory::Fine,
            _ => CargoCategory::Precious,
        }
    }
}

impl std::fmt::Display for CargoCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CargoCategory::Primitive => "primitive goods",
            CargoCategory::Consumer => "consumer goods",
            CargoCategory::Comfort => "comfort goods",
            CargoCategory::Fine => "fine goods",
            CargoCategory::Precious => "precious goods",
        };
        write!(f, "{s}")
    }
}

/// Sale-adjustment table: an SA roll maps to a percentage of base value.
/// Rolls below 3 clamp to 30%; above 20 clamp to 400%.
pub fn sale_percent(sa_roll: i32) -> u32 {
    match sa_roll.clamp(3, 20) {
        3 => 30,
        4 => 40,
        5 => 50,
        6 => 60,
        7 => 70,
        8 => 80,
        9 => 90,
        10 => 100,
        11 => 110,
        12 => 120,
        13 => 130,
        14 => 140,
        15 => 150,
        16 => 160,
        17 => 180,
        18 => 200,
        19 => 300,
        _ => 400,
    }
}

/// Demand modifier from an adjusted 3d6 demand roll.
pub fn demand_modifier(demand_roll: i32) -> i32 {
    match demand_roll {
        i32::MIN..=3 => -5,
        4..=5 => -4,
        6 => -3,
        7 => -2,
        8..=9 => -1,
        10..=11 => 0,
        12..=13 => 1,
        14 => 2,
        15 => 3,
        16..=17 => 4,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_determination_ranges() {
        assert_eq!(CargoCategory::from_determination_roll(3), CargoCategory::Primitive);
        assert_eq!(CargoCategory::from_determination_roll(10), CargoCategory::Consumer);
        assert_eq!(CargoCategory::from_determination_roll(14), CargoCategory::Comfort);
        assert_eq!(CargoCategory::from_determination_roll(17), CargoCategory::Fine);
        assert_eq!(CargoCategory::from_determination_roll(20), CargoCategory::Precious);
        // Clamping
        assert_eq!(CargoCategory::from_determination_roll(1), CargoCategory::Primitive);
        assert_eq!(CargoCategory::from_determination_roll(25), CargoCategory::Precious);
    }

    #[test]
    fn test_sale_percent_anchors() {
        assert_eq!(sale_percent(3), 30);
        assert_eq!(sale_percent(10), 100);
        assert_eq!(sale_percent(16), 160);
        assert_eq!(sale_percent(19), 300);
        assert_eq!(sale_percent(20), 400);
        assert_eq!(sale_percent(0), 30);
        assert_eq!(sale_percent(99), 400);
    }

    proptest! {
        /// The sale-adjustment table is monotone non-decreasing in the roll.
        #[test]
        fn prop_sale_percent_monotone(a in -10i32..30, b in -10i32..30) {
            if a <= b {
                prop_assert!(sale_percent(a) <= sale_percent(b));
            }
        }

        /// The demand table is monotone non-decreasing in the roll.
        #[test]
        fn prop_demand_monotone(a in -5i32..25, b in -5i32..25) {
            if a <= b {
                prop_assert!(demand_modifier(a) <= demand_modifier(b));
            }
        }
    }
}
