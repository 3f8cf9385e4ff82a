//! Port services: fees, repairs, crew hiring, passengers and charters.

use crate::dice::Dice;
use crate::proficiency::{self, CrewQuality, Officer, Skill};
use serde::{Deserialize, Serialize};
use tradewinds_data::defines::{fees, repair, trading};
use tradewinds_data::ports::PortSize;
use tradewinds_data::ships::{CrewComplement, CrewRole};

/// Fees assessed on entry, paid in full for the whole stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortFees {
    pub entrance: u32,
    pub pilot: u32,
    pub moorage: u32,
    /// Berthed at the quay rather than anchored out.
    pub berthed: bool,
}

impl PortFees {
    pub fn total(&self) -> u32 {
        self.entrance + self.pilot + self.moorage
    }
}

/// Assess entrance, pilotage, and moorage for a stay of `days`.
///
/// A berth is taken only when one is free (1d100 <= 80) and the ship
/// either needs yard work (damage over 10%) or is small enough that
/// anchoring out costs more than the quay.
pub fn assess_port_fees(dice: &mut Dice, hull_max: u32, damage_pct: u32, days: u32) -> PortFees {
    let entrance = dice.roll_die(10) + fees::ENTRANCE_BASE;
    let pilot = hull_max;

    let berth_available = dice.chance(fees::BERTH_AVAILABLE_PCT);
    let wants_berth =
        damage_pct > repair::AUTO_REPAIR_AT_PCT || hull_max <= fees::SMALL_SHIP_HULL_MAX;
    let (moorage, berthed) = if berth_available && wants_berth {
        (hull_max * days, true)
    } else {
        (fees::ANCHOR_PER_DAY * days, false)
    };

    PortFees {
        entrance,
        pilot,
        moorage,
        berthed,
    }
}

// ---------------------------------------------------------------------------
// Repairs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairMethod {
    Professional,
    Drydock,
    SelfRepair,
}

impl std::fmt::Display for RepairMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RepairMethod::Professional => "professional",
            RepairMethod::Drydock => "drydock",
            RepairMethod::SelfRepair => "self-repair",
        };
        write!(f, "{s}")
    }
}

/// A patch that holds only until the listed day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempRepair {
    pub points: u32,
    /// Epoch day (see `Date::days_from_epoch`) the patch lets go.
    pub expires_day: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairPlan {
    pub method: RepairMethod,
    /// Hull points restored.
    pub points: u32,
    pub cost: u32,
    pub days: u32,
    /// Botched self-repair points that will fail later.
    pub temporary: Vec<TempRepair>,
}

/// Yard work at full rate: a point a day, 100 gp a point.
pub fn plan_professional(damage: u32) -> RepairPlan {
    RepairPlan {
        method: RepairMethod::Professional,
        points: damage,
        cost: repair::PROFESSIONAL_COST_PER_POINT * damage,
        days: damage,
        temporary: Vec::new(),
    }
}

/// Drydock: faster, but the dock itself charges by the day, scaled to
/// hull size and how busy the port is.
pub fn plan_drydock(damage: u32, hull_max: u32, port_size: PortSize) -> RepairPlan {
    let size_mod: f64 = match port_size {
        PortSize::MajorPort => -0.5,
        PortSize::MinorPort => 0.5,
        _ => 0.0,
    };
    let days = (damage * repair::DRYDOCK_TIME_PCT).div_ceil(100);
    let daily_fee = (hull_max as f64 * 5.0 * (1.0 + size_mod)).round() as u32;
    RepairPlan {
        method: RepairMethod::Drydock,
        points: damage,
        cost: repair::PROFESSIONAL_COST_PER_POINT * damage + days * daily_fee,
        days,
        temporary: Vec::new(),
    }
}

/// Crew repairs with spars and oakum. Needs a ship's carpenter among the
/// officers; restores at most half the hull; each point is a proficiency
/// check and a botched one is a patch that works loose in 1d6 days.
pub fn plan_self_repair(
    dice: &mut Dice,
    damage: u32,
    hull_max: u32,
    carpenter: &Officer,
    crew_quality: CrewQuality,
    today_epoch: i64,
) -> Option<RepairPlan> {
    let skill = if carpenter.has(Skill::ShipCarpentry) {
        Skill::ShipCarpentry
    } else if carpenter.has(Skill::Shipwright) {
        Skill::Shipwright
    } else {
        return None;
    };

    let points = damage.min(hull_max / 2);
    let mut temporary = Vec::new();
    for _ in 0..points {
        let result = proficiency::check(dice, skill, carpenter, None, crew_quality, 0)?;
        if !result.success {
            temporary.push(TempRepair {
                points: 1,
                expires_day: today_epoch + dice.roll_die(6) as i64,
            });
        }
    }

    Some(RepairPlan {
        method: RepairMethod::SelfRepair,
        points,
        cost: repair::SELF_COST_PER_POINT * points,
        days: points * 7,
        temporary,
    })
}

/// Auto mode takes the yard when the damage is worth it and the purse
/// covers it.
pub fn auto_repair_choice(damage_pct: u32, treasury: i64, cost: u32) -> bool {
    damage_pct >= repair::AUTO_REPAIR_AT_PCT && treasury >= cost as i64
}

/// Repairs are offered at Minor Port and larger.
pub fn repairs_offered(port_size: PortSize) -> bool {
    port_size.has_shipyard()
}

// ---------------------------------------------------------------------------
// Crew hiring
// ---------------------------------------------------------------------------

/// Per-role shortfall against the template's required complement.
pub fn crew_shortfall(
    required: &[CrewComplement],
    current: &[CrewComplement],
) -> Vec<(CrewRole, u32)> {
    let count = |list: &[CrewComplement], role: CrewRole| -> u32 {
        list.iter().filter(|c| c.role == role).map(|c| c.count).sum()
    };
    required
        .iter()
        .map(|c| c.role)
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .filter_map(|role| {
            let need = count(required, role);
            let have = count(current, role);
            (need > have).then_some((role, need - have))
        })
        .collect()
}

/// Small ships pick up hands anywhere; larger hulls need a real port.
pub fn hiring_allowed(port_size: PortSize, hull_max: u32) -> bool {
    hull_max <= fees::SMALL_SHIP_HULL_MAX || port_size.has_shipyard()
}

/// Auto mode hires once the shortfall passes a fifth of the complement.
pub fn should_auto_hire(shortfall_total: u32, required_total: u32) -> bool {
    required_total > 0 && shortfall_total * 5 > required_total
}

// ---------------------------------------------------------------------------
// Passengers and charters
// ---------------------------------------------------------------------------

/// Paying passengers looking for passage along the remaining route.
/// Returns (count, total fare).
pub fn passengers(dice: &mut Dice, port_size: PortSize, remaining_mi: u32) -> (u32, u32) {
    let count = (dice.roll_dice(2, 4) as i32 - dice.roll_die(4) as i32
        + port_size.demand_modifier())
    .max(0) as u32;
    let blocks = remaining_mi.div_ceil(trading::TRANSPORT_BLOCK_MILES).max(1);
    let revenue = count * trading::PASSAGE_FARE_PER_BLOCK * blocks;
    (count, revenue)
}

/// A charter commission, offered rarely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charter {
    pub distance_mi: u32,
    pub fee: u32,
}

pub fn charter_opportunity(dice: &mut Dice) -> Option<Charter> {
    if !dice.chance(trading::CHARTER_CHANCE_PCT) {
        return None;
    }
    let distance_mi = dice.roll_dice(2, 20) * 100;
    let fee = (trading::TRANSPORT_FEE_PER_BLOCK
        * distance_mi.div_ceil(trading::TRANSPORT_BLOCK_MILES))
    .max(trading::TRANSPORT_FEE_MIN);
    Some(Charter { distance_mi, fee })
}
