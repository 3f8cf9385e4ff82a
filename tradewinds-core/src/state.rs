//! The voyage state aggregate: ship instance, treasury and ledger, cargo,
//! counters, and the append-only logs.
//!
//! The state is exclusively owned by its engine while a voyage runs and
//! persisted whole between days. Treasury is only mutated through the
//! ledger-recording helpers so the balance chain always reconstructs.

use crate::config::{TradeMode, VoyageMode};
use crate::events::VoyageEvent;
use crate::port::{PortFees, RepairMethod, TempRepair};
use crate::proficiency::{CrewQuality, Officer};
use serde::{Deserialize, Serialize};
use tradewinds_data::calendar::Date;
use tradewinds_data::cargo::CargoCategory;
use tradewinds_data::defines::sailing;
use tradewinds_data::encounters::WaterBody;
use tradewinds_data::ports::{PortId, RouteDef};
use tradewinds_data::ships::{CrewComplement, CrewRole, ShipTemplate};

pub type VoyageId = String;

/// Vessel integrity. At zero the ship sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hull {
    pub value: u32,
    pub max: u32,
}

impl Hull {
    pub fn full(max: u32) -> Self {
        Self { value: max, max }
    }

    pub fn damage(&self) -> u32 {
        self.max - self.value
    }

    pub fn damage_pct(&self) -> u32 {
        if self.max == 0 {
            return 0;
        }
        self.damage() * 100 / self.max
    }

    pub fn apply_damage(&mut self, points: u32) {
        self.value = self.value.saturating_sub(points);
    }

    pub fn repair(&mut self, points: u32) {
        self.value = (self.value + points).min(self.max);
    }

    pub fn is_sunk(&self) -> bool {
        self.value == 0
    }
}

/// A sailing ship on the books: a deep clone of its template, free to
/// diverge from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipInstance {
    pub name: String,
    pub ship_type: String,
    pub hull: Hull,
    pub cargo_capacity: u32,
    pub movement: u32,
    pub crew: Vec<CrewComplement>,
}

impl ShipInstance {
    pub fn from_template(template: &ShipTemplate) -> Self {
        Self {
            name: template.name.clone(),
            ship_type: template.ship_type.clone(),
            hull: Hull::full(template.hull_max),
            cargo_capacity: template.cargo_capacity,
            movement: template.movement,
            crew: template.crew.clone(),
        }
    }

    pub fn base_speed_mi(&self) -> u32 {
        self.movement * sailing::MILES_PER_MOVEMENT
    }

    pub fn total_souls(&self) -> u32 {
        self.crew.iter().map(|c| c.count).sum()
    }

    pub fn count(&self, role: CrewRole) -> u32 {
        self.crew
            .iter()
            .filter(|c| c.role == role)
            .map(|c| c.count)
            .sum()
    }

    pub fn monthly_wage(&self) -> u32 {
        self.crew.iter().map(|c| c.monthly_wage()).sum()
    }

    /// Remove casualties, sailors first, then marines. Returns the number
    /// actually struck from the muster.
    pub fn lose_crew(&mut self, count: u32) -> u32 {
        let mut remaining = count;
        for role in [CrewRole::Sailor, CrewRole::Marine] {
            if remaining == 0 {
                break;
            }
            for c in self.crew.iter_mut().filter(|c| c.role == role) {
                let taken = c.count.min(remaining);
                c.count -= taken;
                remaining -= taken;
                if remaining == 0 {
                    break;
                }
            }
        }
        count - remaining
    }

    /// Restore hands of a role, up to the given count.
    pub fn add_crew(&mut self, role: CrewRole, count: u32) {
        if let Some(c) = self.crew.iter_mut().find(|c| c.role == role) {
            c.count += count;
        } else {
            self.crew.push(CrewComplement::new(role, count, 1));
        }
    }
}

/// The hold. `category` is set exactly when `loads > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentCargo {
    pub category: Option<CargoCategory>,
    pub loads: u32,
    pub purchase_price_per_load: u32,
    /// Leg index at purchase; -1 means bought at the origin.
    pub purchase_leg_index: i32,
    /// Miles carried since purchase; drives the distance bonus.
    pub distance_carried_mi: u32,
}

impl CurrentCargo {
    pub fn empty() -> Self {
        Self {
            category: None,
            loads: 0,
            purchase_price_per_load: 0,
            purchase_leg_index: -1,
            distance_carried_mi: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.loads == 0
    }

    pub fn total_cost(&self) -> u32 {
        self.purchase_price_per_load * self.loads
    }

    pub fn clear(&mut self) {
        *self = Self::empty();
    }
}

/// Expense breakdown by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub wages: u32,
    pub food: u32,
    pub repairs: u32,
    pub fees: u32,
    pub cargo: u32,
    pub taxes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    Wages,
    Food,
    Repairs,
    Fees,
    Cargo,
    Taxes,
}

impl Breakdown {
    pub fn add(&mut self, category: CostCategory, amount: u32) {
        let slot = match category {
            CostCategory::Wages => &mut self.wages,
            CostCategory::Food => &mut self.food,
            CostCategory::Repairs => &mut self.repairs,
            CostCategory::Fees => &mut self.fees,
            CostCategory::Cargo => &mut self.cargo,
            CostCategory::Taxes => &mut self.taxes,
        };
        *slot += amount;
    }

    pub fn total(&self) -> u32 {
        self.wages + self.food + self.repairs + self.fees + self.cargo + self.taxes
    }
}

/// One line of the voyage's books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: Date,
    pub description: String,
    pub income: u32,
    pub expense: u32,
    pub balance: i64,
}

/// A directed port-to-port segment of the route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub from: PortId,
    pub to: PortId,
    pub distance_mi: u32,
    pub water: WaterBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeAction {
    Bought,
    Sold,
    Consigned,
    Delivered,
    Spoiled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub action: TradeAction,
    pub category: CargoCategory,
    pub loads: u32,
    pub price_per_load: u32,
    pub total: u32,
}

/// Everything that happened during one port call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortActivity {
    pub port_id: PortId,
    pub port_name: String,
    pub arrival_date: Date,
    pub days_in_port: u32,
    pub fees: PortFees,
    pub trades: Vec<TradeRecord>,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairLogEntry {
    pub date: Date,
    pub port_id: PortId,
    pub method: RepairMethod,
    pub points: u32,
    pub cost: u32,
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerRecord {
    pub port_id: PortId,
    pub date: Date,
    pub count: u32,
    pub revenue: u32,
}

/// Where the voyage stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum VoyagePhase {
    Origin,
    Sailing { leg: usize },
    InPort { leg: usize },
    Final,
    Failed,
}

/// A consignment contract held for the length of the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsignmentContract {
    pub fee_total: u32,
    pub upfront_paid: u32,
    pub route_distance_mi: u32,
}

/// The single long-lived voyage aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoyageState {
    pub id: VoyageId,

    // Configuration snapshot
    pub ship: ShipInstance,
    pub template_id: String,
    pub route: RouteDef,
    pub legs: Vec<Leg>,
    pub captain: Officer,
    pub lieutenant: Option<Officer>,
    pub trade_mode: TradeMode,
    pub commission_rate_pct: u32,
    pub crew_quality: CrewQuality,
    pub mode: VoyageMode,
    pub auto_repair: bool,
    pub enable_rowing: bool,
    pub automate_trading: bool,
    pub start_date: Date,

    // Dynamic
    pub date: Date,
    pub phase: VoyagePhase,
    pub treasury: i64,
    pub starting_capital: u32,
    pub crew_earnings_from_trade: u32,
    pub revenue_total: u32,
    pub expense_total: u32,
    pub daily_operational_cost: u32,
    pub leg_accumulated_cost: u32,
    pub breakdown: Breakdown,
    pub cargo: CurrentCargo,
    pub consignment: Option<ConsignmentContract>,

    // Counters
    pub total_days: u32,
    pub total_distance: u32,
    pub total_hull_damage: u32,
    pub consecutive_rowing_days: u32,
    pub leg_remaining_mi: u32,
    pub temp_repairs: Vec<TempRepair>,

    // Logs (append-only)
    pub events: Vec<VoyageEvent>,
    pub ports_visited: Vec<PortId>,
    pub port_activities: Vec<PortActivity>,
    pub ledger: Vec<LedgerEntry>,
    pub repair_log: Vec<RepairLogEntry>,
    pub passenger_manifest: Vec<PassengerRecord>,

    // Flags
    pub at_sea: bool,
    pub in_port: bool,
    pub finished: bool,
    pub last_port_id: Option<PortId>,

    // Dice stream, persisted for replay
    pub rng_seed: u64,
    pub rng_state: u64,
}

impl VoyageState {
    /// The opening ledger entry; sets the balance directly.
    pub fn open_ledger(&mut self) {
        debug_assert!(self.ledger.is_empty());
        self.treasury = self.starting_capital as i64;
        self.ledger.push(LedgerEntry {
            date: self.date,
            description: "Voyage capital".to_string(),
            income: 0,
            expense: 0,
            balance: self.treasury,
        });
    }

    /// Append an income entry and move the treasury with it.
    pub fn record_income(&mut self, description: &str, amount: u32) {
        self.treasury += amount as i64;
        self.revenue_total += amount;
        self.ledger.push(LedgerEntry {
            date: self.date,
            description: description.to_string(),
            income: amount,
            expense: 0,
            balance: self.treasury,
        });
    }

    /// Append an expense entry, move the treasury, and file it under a
    /// breakdown category.
    pub fn record_expense(&mut self, description: &str, amount: u32, category: CostCategory) {
        self.treasury -= amount as i64;
        self.expense_total += amount;
        self.breakdown.add(category, amount);
        self.ledger.push(LedgerEntry {
            date: self.date,
            description: description.to_string(),
            income: 0,
            expense: amount,
            balance: self.treasury,
        });
    }

    /// Apply hull damage and keep the running total. Returns hull left.
    pub fn damage_ship(&mut self, points: u32) -> u32 {
        let before = self.ship.hull.value;
        self.ship.hull.apply_damage(points);
        self.total_hull_damage += before - self.ship.hull.value;
        self.ship.hull.value
    }

    pub fn push_event(&mut self, event: VoyageEvent) {
        self.events.push(event);
    }

    /// Leg distances still ahead of the given leg (inclusive of it).
    pub fn downstream_distances(&self, from_leg: usize) -> Vec<u32> {
        self.legs[from_leg.min(self.legs.len())..]
            .iter()
            .map(|l| l.distance_mi)
            .collect()
    }

    pub fn route_distance_mi(&self) -> u32 {
        self.legs.iter().map(|l| l.distance_mi).sum()
    }

    /// Daily cost of keeping the crew: prorated wages plus provisions at
    /// a gold piece per five souls.
    pub fn compute_daily_cost(&self) -> u32 {
        let wage_part = self.ship.monthly_wage().div_ceil(30);
        let food_part = self.ship.total_souls().div_ceil(5);
        wage_part + food_part
    }

    /// Check the ledger balance chain; true when every entry after the
    /// opening one follows from its predecessor.
    pub fn ledger_consistent(&self) -> bool {
        self.ledger.windows(2).all(|pair| {
            pair[1].balance == pair[0].balance + pair[1].income as i64 - pair[1].expense as i64
        }) && self
            .ledger
            .last()
            .map_or(true, |last| last.balance == self.treasury)
    }
}
