//! Ship templates and crew complements.
//!
//! Templates are the reference hulls; a voyage sails a deep-cloned
//! instance (`tradewinds-core::state::ShipInstance`) so mutations never
//! touch the template.

use crate::defines::{sailing, wages};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CrewRole {
    Sailor,
    Oarsman,
    Marine,
    Mate,
    Lieutenant,
    Captain,
}

impl CrewRole {
    /// Monthly wage in gp. Lieutenants are paid by level; captains draw
    /// their pay from the profit share, not wages.
    pub fn monthly_wage(&self, level: u8) -> u32 {
        match self {
            CrewRole::Sailor => wages::SAILOR,
            CrewRole::Oarsman => wages::OARSMAN,
            CrewRole::Marine => wages::MARINE,
            CrewRole::Mate => wages::MATE,
            CrewRole::Lieutenant => wages::LIEUTENANT_PER_LEVEL * level as u32,
            CrewRole::Captain => 0,
        }
    }
}

impl std::fmt::Display for CrewRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CrewRole::Sailor => "sailor",
            CrewRole::Oarsman => "oarsman",
            CrewRole::Marine => "marine",
            CrewRole::Mate => "mate",
            CrewRole::Lieutenant => "lieutenant",
            CrewRole::Captain => "captain",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewComplement {
    pub role: CrewRole,
    pub count: u32,
    pub level: u8,
}

impl CrewComplement {
    pub fn new(role: CrewRole, count: u32, level: u8) -> Self {
        Self { role, count, level }
    }

    pub fn monthly_wage(&self) -> u32 {
        self.role.monthly_wage(self.level) * self.count
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipTemplate {
    pub id: String,
    pub name: String,
    pub ship_type: String,
    pub hull_max: u32,
    /// Loads (half-ton units).
    pub cargo_capacity: u32,
    /// Abstract movement; one point is 8 miles per day under fair wind.
    pub movement: u32,
    pub crew: Vec<CrewComplement>,
}

impl ShipTemplate {
    pub fn base_speed_mi(&self) -> u32 {
        self.movement * sailing::MILES_PER_MOVEMENT
    }

    pub fn required(&self, role: CrewRole) -> u32 {
        self.crew
            .iter()
            .filter(|c| c.role == role)
            .map(|c| c.count)
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct ShipRegistry {
    templates: HashMap<String, ShipTemplate>,
}

impl ShipRegistry {
    pub fn template(&self, id: &str) -> Option<&ShipTemplate> {
        self.templates.get(id)
    }

    pub fn template_ids(&self) -> impl Iterator<Item = &String> {
        self.templates.keys()
    }

    pub fn builtin() -> Self {
        use CrewRole::*;
        let mut templates = HashMap::new();
        let mut add = |id: &str, name: &str, hull_max, cargo_capacity, movement, crew: Vec<CrewComplement>| {
            templates.insert(
                id.to_string(),
                ShipTemplate {
                    id: id.to_string(),
                    name: name.to_string(),
                    ship_type: name.to_string(),
                    hull_max,
                    cargo_capacity,
                    movement,
                    crew,
                },
            );
        };

        add(
            "coaster",
            "Coaster",
            12,
            8,
            12,
            vec![
                CrewComplement::new(Sailor, 6, 1),
                CrewComplement::new(Mate, 1, 3),
                CrewComplement::new(Captain, 1, 5),
            ],
        );
        add(
            "cog",
            "Trading Cog",
            20,
            15,
            15,
            vec![
                CrewComplement::new(Sailor, 10, 1),
                CrewComplement::new(Mate, 1, 3),
                CrewComplement::new(Captain, 1, 5),
            ],
        );
        add(
            "caravel",
            "Caravel",
            30,
            25,
            18,
            vec![
                CrewComplement::new(Sailor, 18, 1),
                CrewComplement::new(Marine, 4, 2),
                CrewComplement::new(Mate, 2, 3),
                CrewComplement::new(Lieutenant, 1, 5),
                CrewComplement::new(Captain, 1, 6),
            ],
        );
        add(
            "galleon",
            "Galleon",
            60,
            50,
            12,
            vec![
                CrewComplement::new(Sailor, 30, 1),
                CrewComplement::new(Marine, 10, 2),
                CrewComplement::new(Mate, 2, 4),
                CrewComplement::new(Lieutenant, 1, 6),
                CrewComplement::new(Captain, 1, 7),
            ],
        );
        add(
            "longship",
            "Longship",
            15,
            8,
            15,
            vec![
                CrewComplement::new(Oarsman, 20, 1),
                CrewComplement::new(Sailor, 4, 1),
                CrewComplement::new(Captain, 1, 5),
            ],
        );

        Self { templates }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_speed() {
        let reg = ShipRegistry::builtin();
        let cog = reg.template("cog").unwrap();
        assert_eq!(cog.base_speed_mi(), 120);
    }

    #[test]
    fn test_wages() {
        assert_eq!(CrewRole::Sailor.monthly_wage(1), 2);
        assert_eq!(CrewRole::Lieutenant.monthly_wage(6), 600);
        let c = CrewComplement::new(CrewRole::Marine, 10, 2);
        assert_eq!(c.monthly_wage(), 30);
    }

    #[test]
    fn test_required_complement() {
        let reg = ShipRegistry::builtin();
        let galleon = reg.template("galleon").unwrap();
        assert_eq!(galleon.required(CrewRole::Sailor), 30);
        assert_eq!(galleon.required(CrewRole::Oarsman), 0);
    }
}
