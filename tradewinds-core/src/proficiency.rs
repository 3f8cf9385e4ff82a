//! Skill proficiency checks.
//!
//! Checks are d20 roll-under: the target number comes from a fixed
//! skill-to-ability mapping, modifiers are added to the roll, and success
//! means the modified roll stayed at or under the target. The miss margin
//! feeds the hazard damage tables.

use crate::dice::Dice;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Bargaining,
    Piloting,
    Navigation,
    Smuggling,
    Seamanship,
    Appraising,
    Trading,
    CustomsInspection,
    ShipCarpentry,
    Shipwright,
    Swimming,
    WeatherSense,
}

/// The six ability scores, 3-18.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abilities {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl Abilities {
    pub fn all_in_range(&self) -> bool {
        [
            self.strength,
            self.dexterity,
            self.constitution,
            self.intelligence,
            self.wisdom,
            self.charisma,
        ]
        .iter()
        .all(|&a| (3..=18).contains(&a))
    }
}

impl Default for Abilities {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

/// A ship's officer: the captain or the lieutenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
    pub name: String,
    pub abilities: Abilities,
    pub skills: HashSet<Skill>,
    pub level: Option<u8>,
}

impl Officer {
    pub fn new(name: &str, abilities: Abilities, skills: &[Skill]) -> Self {
        Self {
            name: name.to_string(),
            abilities,
            skills: skills.iter().copied().collect(),
            level: None,
        }
    }

    pub fn has(&self, skill: Skill) -> bool {
        self.skills.contains(&skill)
    }

    /// Fill an unset captain level from the 1d10 table:
    /// 1-4 => 5, 5-7 => 6, 8-9 => 7, 10 => 8.
    pub fn fill_level(&mut self, dice: &mut Dice) -> u8 {
        if let Some(level) = self.level {
            return level;
        }
        let level = match dice.roll_die(10) {
            1..=4 => 5,
            5..=7 => 6,
            8..=9 => 7,
            _ => 8,
        };
        self.level = Some(level);
        level
    }
}

/// Crew quality, as rated by the harbormasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrewQuality {
    Landlubber,
    Green,
    Average,
    Trained,
    Crack,
    OldSalts,
}

impl CrewQuality {
    /// Modifier added to every skill roll. Roll-under, so a practiced crew
    /// subtracts.
    pub fn modifier(&self) -> i32 {
        match self {
            CrewQuality::Landlubber => 2,
            CrewQuality::Green => 1,
            CrewQuality::Average => 0,
            CrewQuality::Trained => -1,
            CrewQuality::Crack => -2,
            CrewQuality::OldSalts => -2,
        }
    }
}

impl std::fmt::Display for CrewQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CrewQuality::Landlubber => "Landlubber",
            CrewQuality::Green => "Green",
            CrewQuality::Average => "Average",
            CrewQuality::Trained => "Trained",
            CrewQuality::Crack => "Crack",
            CrewQuality::OldSalts => "Old Salts",
        };
        write!(f, "{s}")
    }
}

/// Outcome of a proficiency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub success: bool,
    /// Modified roll total.
    pub roll: i32,
    /// Target number.
    pub needed: i32,
    /// How far over the target the roll landed; zero on success.
    pub miss_margin: u32,
    /// How far under; zero on failure.
    pub success_margin: u32,
}

/// Target number for a skill the character actually knows.
pub fn target_number(skill: Skill, abilities: &Abilities) -> i32 {
    let a = abilities;
    let (score, adj) = match skill {
        Skill::Bargaining => (a.charisma, -2),
        Skill::Piloting => (a.wisdom, 1),
        Skill::Navigation => (a.intelligence, -3),
        Skill::Smuggling => (a.wisdom, -4),
        Skill::Seamanship => (a.dexterity, 1),
        Skill::Appraising => (a.intelligence, -2),
        Skill::Trading => (a.intelligence, -1),
        Skill::CustomsInspection => (a.wisdom, -1),
        Skill::ShipCarpentry => (a.intelligence, -2),
        Skill::Shipwright => (a.intelligence, -3),
        Skill::Swimming => (a.strength, 1),
        Skill::WeatherSense => (a.wisdom, -1),
    };
    score as i32 + adj
}

/// Target for an unskilled piloting attempt.
fn unskilled_piloting_target(abilities: &Abilities) -> i32 {
    abilities.wisdom as i32 - 4
}

/// Run a skill check for the captain, with the lieutenant assisting where
/// the skill allows it. Returns `None` when the captain lacks the skill
/// and no unskilled attempt exists (every skill but piloting).
pub fn check(
    dice: &mut Dice,
    skill: Skill,
    captain: &Officer,
    lieutenant: Option<&Officer>,
    crew_quality: CrewQuality,
    modifier: i32,
) -> Option<CheckResult> {
    let needed = if captain.has(skill) {
        target_number(skill, &captain.abilities)
    } else if skill == Skill::Piloting {
        unskilled_piloting_target(&captain.abilities)
    } else {
        return None;
    };

    let solo_skill = matches!(skill, Skill::Smuggling | Skill::Piloting);
    let lieutenant_assist = match lieutenant {
        Some(lt) if !solo_skill && lt.has(skill) => 1,
        _ => 0,
    };
    let inspection_bonus = if skill == Skill::Smuggling {
        let either = captain.has(Skill::CustomsInspection)
            || lieutenant.is_some_and(|lt| lt.has(Skill::CustomsInspection));
        if either {
            1
        } else {
            0
        }
    } else {
        0
    };

    let effective_modifier =
        crew_quality.modifier() + modifier + lieutenant_assist + inspection_bonus;
    let roll = dice.d20() as i32 + effective_modifier;
    let success = roll <= needed;

    Some(CheckResult {
        success,
        roll,
        needed,
        miss_margin: (roll - needed).max(0) as u32,
        success_margin: (needed - roll).max(0) as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captain_with(skills: &[Skill], wisdom: u8, charisma: u8) -> Officer {
        Officer::new(
            "Aldra Voss",
            Abilities {
                wisdom,
                charisma,
                ..Abilities::default()
            },
            skills,
        )
    }

    #[test]
    fn test_target_numbers() {
        let a = Abilities {
            charisma: 14,
            wisdom: 12,
            intelligence: 15,
            dexterity: 11,
            ..Abilities::default()
        };
        assert_eq!(target_number(Skill::Bargaining, &a), 12);
        assert_eq!(target_number(Skill::Piloting, &a), 13);
        assert_eq!(target_number(Skill::Navigation, &a), 12);
        assert_eq!(target_number(Skill::Smuggling, &a), 8);
        assert_eq!(target_number(Skill::Seamanship, &a), 12);
    }

    #[test]
    fn test_roll_under_success_and_margins() {
        let cap = captain_with(&[Skill::Piloting], 12, 10); // target 13
        let mut dice = Dice::scripted(&[10]);
        let r = check(&mut dice, Skill::Piloting, &cap, None, CrewQuality::Average, 0).unwrap();
        assert!(r.success);
        assert_eq!(r.needed, 13);
        assert_eq!(r.miss_margin, 0);
        assert_eq!(r.success_margin, 3);

        let mut dice = Dice::scripted(&[20]);
        let r = check(&mut dice, Skill::Piloting, &cap, None, CrewQuality::Average, 0).unwrap();
        assert!(!r.success);
        assert_eq!(r.miss_margin, 7);
    }

    #[test]
    fn test_modifier_is_a_penalty() {
        // Storm piloting: +5 to the roll makes the check harder.
        let cap = captain_with(&[Skill::Piloting], 12, 10);
        let mut dice = Dice::scripted(&[10]);
        let r = check(&mut dice, Skill::Piloting, &cap, None, CrewQuality::Average, 5).unwrap();
        assert_eq!(r.roll, 15);
        assert!(!r.success);
        assert_eq!(r.miss_margin, 2);
    }

    #[test]
    fn test_unskilled_fails_except_piloting() {
        let cap = captain_with(&[], 12, 10);
        let mut dice = Dice::scripted(&[5]);
        assert!(check(&mut dice, Skill::Bargaining, &cap, None, CrewQuality::Average, 0).is_none());

        // Unskilled piloting falls back to WIS - 4.
        let mut dice = Dice::scripted(&[5]);
        let r = check(&mut dice, Skill::Piloting, &cap, None, CrewQuality::Average, 0).unwrap();
        assert_eq!(r.needed, 8);
        assert!(r.success);
    }

    #[test]
    fn test_lieutenant_assist_not_for_solo_skills() {
        let cap = captain_with(&[Skill::Bargaining, Skill::Piloting, Skill::Smuggling], 12, 14);
        let lt = captain_with(&[Skill::Bargaining, Skill::Piloting, Skill::Smuggling], 12, 10);

        // Bargaining: lieutenant adds +1 to the roll.
        let mut dice = Dice::scripted(&[10]);
        let r = check(&mut dice, Skill::Bargaining, &cap, Some(&lt), CrewQuality::Average, 0).unwrap();
        assert_eq!(r.roll, 11);

        // Piloting: no assist.
        let mut dice = Dice::scripted(&[10]);
        let r = check(&mut dice, Skill::Piloting, &cap, Some(&lt), CrewQuality::Average, 0).unwrap();
        assert_eq!(r.roll, 10);
    }

    #[test]
    fn test_smuggling_customs_inspection_bonus() {
        let cap = captain_with(&[Skill::Smuggling], 16, 10); // target 12
        let lt = captain_with(&[Skill::CustomsInspection], 10, 10);
        let mut dice = Dice::scripted(&[10]);
        let r = check(&mut dice, Skill::Smuggling, &cap, Some(&lt), CrewQuality::Average, 0).unwrap();
        assert_eq!(r.roll, 11); // +1 from the lieutenant's customs knowledge
    }

    #[test]
    fn test_crew_quality_modifiers() {
        assert_eq!(CrewQuality::Landlubber.modifier(), 2);
        assert_eq!(CrewQuality::OldSalts.modifier(), -2);

        let cap = captain_with(&[Skill::Seamanship], 12, 10);
        let mut dice = Dice::scripted(&[12]);
        let r = check(&mut dice, Skill::Seamanship, &cap, None, CrewQuality::Crack, 0).unwrap();
        assert_eq!(r.roll, 10);
    }

    #[test]
    fn test_captain_level_table() {
        let mut officer = Officer::new("Aldra Voss", Abilities::default(), &[]);
        let mut dice = Dice::scripted(&[3]);
        assert_eq!(officer.fill_level(&mut dice), 5);

        let mut officer = Officer::new("Aldra Voss", Abilities::default(), &[]);
        let mut dice = Dice::scripted(&[10]);
        assert_eq!(officer.fill_level(&mut dice), 8);

        // Preset level wins.
        let mut officer = Officer::new("Aldra Voss", Abilities::default(), &[]);
        officer.level = Some(6);
        let mut dice = Dice::scripted(&[1]);
        assert_eq!(officer.fill_level(&mut dice), 6);
    }
}
