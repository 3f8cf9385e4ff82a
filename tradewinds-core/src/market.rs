//! Port trade resolution: merchants, offers, purchase and sale pricing,
//! customs, smuggling, profit distribution, and perishability.
//!
//! A transaction is conducted either by the captain or by a hired port
//! agent who substitutes bargaining and appraisal for a cut. All the
//! interlocking rolls funnel through here so the engine only sees
//! settled numbers.

use crate::dice::Dice;
use crate::proficiency::{self, CheckResult, CrewQuality, Officer, Skill};
use serde::{Deserialize, Serialize};
use tradewinds_data::cargo::{demand_modifier, sale_percent, CargoCategory};
use tradewinds_data::defines::trading as defines;
use tradewinds_data::ports::PortSize;

/// A contracted middleman. Skill is a flat d20 target; the fee comes out
/// of the sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortAgent {
    pub skill_target: i32,
    pub fee_pct: u32,
}

impl PortAgent {
    /// Agent quality and price are rolled per engagement:
    /// skill 10 + 1d8 + 1d4 - 1 (11-21), fee 2d10 + 5 percent (7-25).
    pub fn hire(dice: &mut Dice) -> Self {
        Self {
            skill_target: 10 + dice.roll_die(8) as i32 + dice.roll_die(4) as i32 - 1,
            fee_pct: dice.roll_dice(2, 10) + 5,
        }
    }
}

/// Who is at the table for a transaction.
#[derive(Debug, Clone, Copy)]
pub struct TradeContext<'a> {
    pub captain: &'a Officer,
    pub lieutenant: Option<&'a Officer>,
    pub crew_quality: CrewQuality,
    pub agent: Option<PortAgent>,
}

impl TradeContext<'_> {
    /// Run a trade-table check. The agent substitutes bargaining and
    /// appraisal; everything else stays with the officers.
    fn check(&self, dice: &mut Dice, skill: Skill) -> Option<CheckResult> {
        if let Some(agent) = self.agent {
            if matches!(skill, Skill::Bargaining | Skill::Appraising) {
                let roll = dice.d20() as i32;
                let needed = agent.skill_target;
                return Some(CheckResult {
                    success: roll <= needed,
                    roll,
                    needed,
                    miss_margin: (roll - needed).max(0) as u32,
                    success_margin: (needed - roll).max(0) as u32,
                });
            }
        }
        proficiency::check(dice, skill, self.captain, self.lieutenant, self.crew_quality, 0)
    }

    /// True when nobody at the table knows any of the trading skills.
    fn no_trade_skills(&self) -> bool {
        if self.agent.is_some() {
            return false;
        }
        let knows = |o: &Officer| {
            o.has(Skill::Bargaining) || o.has(Skill::Appraising) || o.has(Skill::Trading)
        };
        !knows(self.captain) && !self.lieutenant.is_some_and(knows)
    }
}

// ---------------------------------------------------------------------------
// Merchants
// ---------------------------------------------------------------------------

/// Reaction adjustment from the captain's bearing.
pub fn charisma_reaction_adj(charisma: u8) -> i32 {
    match charisma {
        0..=5 => -2,
        6..=8 => -1,
        9..=13 => 0,
        14..=15 => 1,
        16..=17 => 2,
        _ => 3,
    }
}

/// Merchants willing to deal this visit.
pub fn merchants_available(dice: &mut Dice, port_size: PortSize, charisma: u8) -> u32 {
    let n = dice.roll_die(6) as i32
        + port_size.demand_modifier()
        + charisma_reaction_adj(charisma);
    n.max(1) as u32
}

/// Merchants seen in a given week of a stay (1-based), staggered so a
/// long layover keeps producing new faces up to the total.
pub fn merchants_in_week(total: u32, week: u32) -> u32 {
    let first = total.div_ceil(2);
    let second = total.div_ceil(4);
    let n = match week {
        0 => 0,
        1 => first,
        2 => second,
        later => second + (later - 2),
    };
    n.min(total)
}

// ---------------------------------------------------------------------------
// Offers and purchase pricing
// ---------------------------------------------------------------------------

/// What one merchant puts on the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoOffer {
    pub category: CargoCategory,
    pub loads_available: u32,
    pub price_per_load: u32,
    /// Unadjusted 3d6 type roll; scarcer types come in smaller lots.
    pub raw_type_roll: u32,
    /// Percent swing from the bargaining check, signed.
    pub bargain_pct: i32,
}

/// Roll a merchant's offer: cargo type, quantity, and a bargained price.
pub fn generate_offer(dice: &mut Dice, port_size: PortSize, ctx: &TradeContext) -> CargoOffer {
    let raw = dice.roll_dice(3, 6);

    // Appraisal nudges the determination roll: a sharp eye finds the
    // better lot, a clumsy one gets shown dross.
    let appraisal_adj = match ctx.check(dice, Skill::Appraising) {
        Some(r) if r.success => 1,
        Some(r) if r.roll % 2 != 0 => -1,
        _ => 0,
    };

    let adjusted = (raw as i32 + port_size.demand_modifier() + appraisal_adj).clamp(3, 20);
    let category = CargoCategory::from_determination_roll(adjusted);
    let loads_available = (dice.roll_dice(3, 8) as i32 - raw as i32).max(1) as u32;

    let bargain_pct = match ctx.check(dice, Skill::Bargaining) {
        Some(r) if r.success => -5 * (r.success_margin.min(5) as i32),
        Some(r) => 5 * (r.miss_margin.min(5) as i32),
        None => 0,
    };

    let base = category.base_value();
    let price_per_load = (base as i64 * (100 + bargain_pct) as i64 / 100).max(1) as u32;

    CargoOffer {
        category,
        loads_available,
        price_per_load,
        raw_type_roll: raw,
        bargain_pct,
    }
}

// ---------------------------------------------------------------------------
// Distance categories and perishability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceCategory {
    Short,
    Medium,
    Long,
    Extraordinary,
}

impl DistanceCategory {
    pub fn modifier(&self) -> i32 {
        match self {
            DistanceCategory::Short => -1,
            DistanceCategory::Medium => 0,
            DistanceCategory::Long => 2,
            DistanceCategory::Extraordinary => 4,
        }
    }

    /// Spoilage threshold: cargo sold under this category was expected to
    /// travel at most this far.
    pub fn threshold_mi(&self) -> u32 {
        match self {
            DistanceCategory::Short => defines::SHORT_MILES,
            DistanceCategory::Medium => defines::MEDIUM_MILES,
            DistanceCategory::Long => defines::LONG_MILES,
            DistanceCategory::Extraordinary => u32::MAX,
        }
    }

    fn next(&self) -> Option<DistanceCategory> {
        match self {
            DistanceCategory::Short => Some(DistanceCategory::Medium),
            DistanceCategory::Medium => Some(DistanceCategory::Long),
            DistanceCategory::Long => Some(DistanceCategory::Extraordinary),
            DistanceCategory::Extraordinary => None,
        }
    }
}

/// Roll the sale's distance category. A haul over 500 miles is always
/// Extraordinary, whatever the die says.
pub fn roll_distance_category(dice: &mut Dice, actual_distance_mi: u32) -> DistanceCategory {
    let rolled = match dice.roll_die(6) {
        1..=2 => DistanceCategory::Short,
        3..=5 => DistanceCategory::Medium,
        _ => DistanceCategory::Long,
    };
    if actual_distance_mi > defines::LONG_MILES {
        DistanceCategory::Extraordinary
    } else {
        rolled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoilageStep {
    pub roll: u32,
    pub spoiled: u32,
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerishResult {
    pub remaining: u32,
    pub spoiled_total: u32,
    pub steps: Vec<SpoilageStep>,
}

/// Serial spoilage for cargo carried past its category threshold. Each
/// excess category step risks a quarter of the remaining loads (25%
/// chance, ceiling).
pub fn apply_perishability(
    dice: &mut Dice,
    category: DistanceCategory,
    actual_distance_mi: u32,
    loads: u32,
) -> PerishResult {
    let mut steps = Vec::new();
    let mut remaining = loads;
    let mut current = category;

    while actual_distance_mi > current.threshold_mi() {
        let Some(next) = current.next() else { break };
        current = next;
        if remaining == 0 {
            break;
        }
        let roll = dice.d100();
        let spoiled = if roll <= 25 {
            remaining.div_ceil(4)
        } else {
            0
        };
        remaining -= spoiled;
        steps.push(SpoilageStep {
            roll,
            spoiled,
            remaining,
        });
    }

    PerishResult {
        remaining,
        spoiled_total: loads - remaining,
        steps,
    }
}

// ---------------------------------------------------------------------------
// Sale pricing
// ---------------------------------------------------------------------------

/// Everything that went into a settled sale price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleBreakdown {
    pub sa_roll: i32,
    pub percent_of_base: u32,
    pub price_per_load: u32,
    pub loads: u32,
    pub total: u32,
    pub demand_mod: i32,
    pub distance_category: DistanceCategory,
    pub distance_mod: i32,
    pub bargain_mod: i32,
    pub appraisal_mod: i32,
    pub precious_bonus: i32,
    pub no_skill_penalty: i32,
    pub bargain_margin: u32,
}

/// Resolve a sale of `loads` of `category` goods.
///
/// The distance category must come from [`roll_distance_category`] and
/// perishability must already have been applied; `loads` is what survived
/// the voyage.
pub fn resolve_sale(
    dice: &mut Dice,
    category: CargoCategory,
    loads: u32,
    port_size: PortSize,
    distance_category: DistanceCategory,
    ctx: &TradeContext,
) -> SaleBreakdown {
    // Demand: 3d6, bent by the trade skill before the table lookup.
    let mut demand_roll = dice.roll_dice(3, 6) as i32;
    match ctx.check(dice, Skill::Trading) {
        Some(r) if r.success => demand_roll += 4,
        Some(r) if r.roll % 2 != 0 => demand_roll -= 4,
        _ => {}
    }
    let agent_penalty = if ctx.agent.is_some() { -1 } else { 0 };
    let demand_mod = demand_modifier(demand_roll) + port_size.demand_modifier() + agent_penalty;

    let distance_mod = distance_category.modifier();

    let precious_bonus =
        if category == CargoCategory::Precious && dice.chance(10) { 4 } else { 0 };

    let (bargain_mod, bargain_margin) = match ctx.check(dice, Skill::Bargaining) {
        Some(r) if r.success => (1, r.success_margin),
        Some(r) if r.roll % 2 != 0 => (-1, 0),
        Some(_) => (0, 0),
        None => (0, 0),
    };
    let appraisal_mod = match ctx.check(dice, Skill::Appraising) {
        Some(r) if r.success => 1,
        Some(r) if r.roll % 2 != 0 => -1,
        _ => 0,
    };

    let no_skill_penalty = if ctx.no_trade_skills() { -2 } else { 0 };

    let sa_roll = dice.roll_dice(3, 6) as i32
        + demand_mod
        + distance_mod
        + bargain_mod
        + appraisal_mod
        + precious_bonus
        + no_skill_penalty;

    let percent_of_base = sale_percent(sa_roll);
    let base = category.base_value();
    let raw_price = base as u64 * percent_of_base as u64 / 100;

    // Driving a hard bargain tops the price up, 5% per point of margin,
    // capped at +25%.
    let markup = (5 * bargain_margin).min(25);
    let price_per_load = (raw_price * (100 + markup) as u64 / 100) as u32;
    let total = price_per_load * loads;

    SaleBreakdown {
        sa_roll,
        percent_of_base,
        price_per_load,
        loads,
        total,
        demand_mod,
        distance_category,
        distance_mod,
        bargain_mod,
        appraisal_mod,
        precious_bonus,
        no_skill_penalty,
        bargain_margin,
    }
}

// ---------------------------------------------------------------------------
// Customs and smuggling
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomsAssessment {
    pub percent: u32,
    pub tax: u32,
}

/// Customs on the declared cargo value.
pub fn customs_tax(dice: &mut Dice, cargo_value: u32) -> CustomsAssessment {
    let percent = dice.roll_dice(2, 10).clamp(1, 100);
    CustomsAssessment {
        percent,
        tax: cargo_value * percent / 100,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmugglingOutcome {
    pub attempted: bool,
    pub success: bool,
    pub assessment: CustomsAssessment,
}

/// Try to slip the cargo past the customs house. Agents never smuggle;
/// in automated trade the captain only risks it when skilled enough and
/// the tax is worth dodging.
pub fn maybe_smuggle(
    dice: &mut Dice,
    ctx: &TradeContext,
    assessment: CustomsAssessment,
    automate: bool,
) -> SmugglingOutcome {
    let declined = SmugglingOutcome {
        attempted: false,
        success: false,
        assessment,
    };

    if ctx.agent.is_some() || !ctx.captain.has(Skill::Smuggling) {
        return declined;
    }
    if automate {
        let target = proficiency::target_number(Skill::Smuggling, &ctx.captain.abilities);
        if target < defines::SMUGGLE_MIN_TARGET || assessment.tax <= defines::SMUGGLE_MIN_TAX {
            return declined;
        }
    }

    let Some(result) = proficiency::check(
        dice,
        Skill::Smuggling,
        ctx.captain,
        ctx.lieutenant,
        ctx.crew_quality,
        0,
    ) else {
        return declined;
    };

    if result.success {
        SmugglingOutcome {
            attempted: true,
            success: true,
            assessment: CustomsAssessment {
                percent: assessment.percent,
                tax: 0,
            },
        }
    } else {
        // Caught: the assessors take ten times their due.
        SmugglingOutcome {
            attempted: true,
            success: false,
            assessment: CustomsAssessment {
                percent: assessment.percent * 10,
                tax: assessment.tax * 10,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitSplit {
    pub owner: u32,
    pub crew: u32,
}

/// Speculation settlement: the owner recovers the purchase and half the
/// profit; the crew shares the rest. Losses fall on the owner alone.
pub fn split_speculation(sale: u32, purchase: u32, agent_fee: u32) -> ProfitSplit {
    let net = sale as i64 - agent_fee as i64;
    let profit = net - purchase as i64;
    if profit > 0 {
        let owner = purchase as i64 + profit / 2;
        ProfitSplit {
            owner: owner as u32,
            crew: (net - owner) as u32,
        }
    } else {
        ProfitSplit {
            owner: net.max(0) as u32,
            crew: 0,
        }
    }
}

/// Transport fee for consigned freight: 40 gp per 500-mile block per two
/// loads, 100 gp floor. Half is paid at origin, half on delivery.
pub fn transport_fee(distance_mi: u32, loads: u32) -> u32 {
    (distance_mi.div_ceil(defines::TRANSPORT_BLOCK_MILES) * defines::TRANSPORT_FEE_PER_BLOCK
        * loads
        / 2)
    .max(defines::TRANSPORT_FEE_MIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsignmentSettlement {
    /// Crew commission taken from the sale value.
    pub commission: u32,
    /// What the consignor receives of the sale.
    pub consignor_payout: u32,
    /// Second half of the transport fee, paid to the owner on delivery.
    pub delivery_fee_half: u32,
}

pub fn settle_consignment(
    sale: u32,
    commission_rate_pct: u32,
    distance_mi: u32,
    loads: u32,
) -> ConsignmentSettlement {
    let commission = sale * commission_rate_pct / 100;
    let fee = transport_fee(distance_mi, loads);
    ConsignmentSettlement {
        commission,
        consignor_payout: sale - commission,
        delivery_fee_half: fee - fee / 2,
    }
}
