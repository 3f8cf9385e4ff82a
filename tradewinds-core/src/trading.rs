//! Trading strategy: buy, sell, hold, wait.
//!
//! Pure decision rules over deterministic scoring; no dice, no state.
//! The engine asks this module what to do and the market module carries
//! it out.

use serde::{Deserialize, Serialize};
use tradewinds_data::cargo::{sale_percent, CargoCategory};
use tradewinds_data::defines::trading as defines;

/// Sale bonus by distance carried since purchase.
pub fn distance_bonus(distance_mi: u32) -> i32 {
    if distance_mi > defines::LONG_MILES {
        4
    } else if distance_mi > defines::MEDIUM_MILES {
        2
    } else if distance_mi > defines::SHORT_MILES {
        0
    } else {
        -1
    }
}

/// Expected sale value as a percentage of base, assuming an average SA
/// roll (mean 3d6 rounds to 10) at the given distance and demand.
pub fn expected_sale_percent(distance_mi: u32, demand_mod: i32) -> u32 {
    sale_percent(10 + distance_bonus(distance_mi) + demand_mod)
}

/// A merchant's offer as the strategy sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferView {
    pub category: CargoCategory,
    pub price_per_load: u32,
    pub loads_available: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseDecision {
    pub accept: bool,
    pub loads: u32,
    pub reason: String,
}

impl PurchaseDecision {
    fn refuse(reason: &str) -> Self {
        Self {
            accept: false,
            loads: 0,
            reason: reason.to_string(),
        }
    }
}

/// Decide whether and how much to buy.
///
/// `downstream_leg_distances` are the remaining leg lengths in sailing
/// order; the best sale distance is the farthest cumulative haul.
pub fn decide_purchase(
    offer: &OfferView,
    downstream_leg_distances: &[u32],
    hold_free: u32,
    treasury: i64,
) -> PurchaseDecision {
    if downstream_leg_distances.is_empty() {
        return PurchaseDecision::refuse("At the final port; nothing to carry it to");
    }
    if offer.price_per_load == 0 || hold_free == 0 {
        return PurchaseDecision::refuse("No hold space");
    }

    let best_sale_distance: u32 = downstream_leg_distances.iter().sum();
    let base = offer.category.base_value();
    let price_ratio_pct = offer.price_per_load * 100 / base;
    let expected_profit_per_load = base as i64
        * expected_sale_percent(best_sale_distance, 0) as i64
        / 100
        - offer.price_per_load as i64;

    if price_ratio_pct > 110 && expected_profit_per_load < 0 {
        return PurchaseDecision::refuse("Overpriced with no distance to recover it");
    }

    let accept_with_reserve = |reserve_pct: u32, reason: String| {
        let spendable = treasury.max(0) as u64 * (100 - reserve_pct) as u64 / 100;
        let affordable = (spendable / offer.price_per_load as u64) as u32;
        let loads = hold_free.min(offer.loads_available).min(affordable);
        if loads == 0 {
            PurchaseDecision::refuse("Cannot afford a single load at reserve")
        } else {
            PurchaseDecision {
                accept: true,
                loads,
                reason,
            }
        }
    };

    if best_sale_distance > defines::LONG_MILES {
        return accept_with_reserve(
            defines::RESERVE_EXTRAORDINARY_PCT,
            "Extraordinary distance, guaranteed +4".to_string(),
        );
    }

    if best_sale_distance < defines::MEDIUM_MILES {
        if price_ratio_pct <= 85 {
            return accept_with_reserve(
                defines::RESERVE_SHORT_PCT,
                format!("Cheap at {price_ratio_pct}% of base; worth a short haul"),
            );
        }
        return PurchaseDecision::refuse("Too dear for a short haul");
    }

    if price_ratio_pct <= 100 || expected_profit_per_load > 0 {
        return accept_with_reserve(
            defines::RESERVE_MEDIUM_PCT,
            format!("Fair price at {price_ratio_pct}% of base over a medium haul"),
        );
    }
    PurchaseDecision::refuse("No expected profit over the remaining route")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleChoice {
    Sell,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleDecision {
    pub choice: SaleChoice,
    pub reason: String,
}

/// Decide whether to sell here or carry the cargo one more leg.
pub fn decide_sale(
    at_final_port: bool,
    distance_traveled: u32,
    distance_to_next: Option<u32>,
) -> SaleDecision {
    if at_final_port {
        return SaleDecision {
            choice: SaleChoice::Sell,
            reason: "Final port; selling out".to_string(),
        };
    }

    let current = distance_bonus(distance_traveled);
    let future = distance_bonus(distance_traveled + distance_to_next.unwrap_or(0));

    if current < 4 && future >= 4 {
        return SaleDecision {
            choice: SaleChoice::Hold,
            reason: "One more leg reaches the extraordinary bonus".to_string(),
        };
    }
    if future >= current + 2 {
        return SaleDecision {
            choice: SaleChoice::Hold,
            reason: "The next leg improves the distance bonus".to_string(),
        };
    }
    if current >= 2 {
        return SaleDecision {
            choice: SaleChoice::Sell,
            reason: format!("Good distance bonus (+{current}) in hand"),
        };
    }
    SaleDecision {
        choice: SaleChoice::Sell,
        reason: "No meaningful improvement ahead; freeing the hold".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitDecision {
    pub wait: bool,
    pub reason: String,
}

/// Decide whether waiting a week in port for a better market beats
/// paying the wait cost.
pub fn decide_wait(hold_value: u32, weekly_wait_cost: u32) -> WaitDecision {
    let potential_savings = hold_value * 15 / 100;
    if potential_savings as u64 > weekly_wait_cost as u64 * 3 / 2 {
        WaitDecision {
            wait: true,
            reason: format!("Waiting could save {potential_savings} gp on a full hold"),
        }
    } else {
        WaitDecision {
            wait: false,
            reason: "Waiting costs more than it could save".to_string(),
        }
    }
}
