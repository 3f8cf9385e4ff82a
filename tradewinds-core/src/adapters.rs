//! Capability interfaces injected into the engine.
//!
//! The core depends only on these traits: weather generation, decision
//! making, and user-visible notification. Automated and manual play use
//! the same typed request/reply channel; only the adapter changes.

use crate::dice::Dice;
use crate::market::CargoOffer;
use crate::port::{Charter, RepairPlan};
use crate::trading::{PurchaseDecision, SaleDecision};
use crate::weather::{PrecipKind, Precipitation, Sky, Temperature, WeatherRecord, Wind, WindDirection};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tradewinds_data::calendar::Date;

/// Supplies one weather record per requested day.
pub trait WeatherAdapter {
    fn generate_day_weather(&mut self, date: &Date) -> WeatherRecord;
}

/// Built-in fallback when no weather capability is attached: a workable
/// breeze of 2d10 + 5 mph under a partly cloudy sky.
pub struct FallbackWeather<'a> {
    pub dice: &'a mut Dice,
}

impl WeatherAdapter for FallbackWeather<'_> {
    fn generate_day_weather(&mut self, _date: &Date) -> WeatherRecord {
        fallback_weather(self.dice)
    }
}

/// The fallback rule itself, usable without the adapter wrapper.
pub fn fallback_weather(dice: &mut Dice) -> WeatherRecord {
    WeatherRecord {
        temperature: Temperature { high: 65, low: 50 },
        wind: Wind {
            speed_mph: dice.roll_dice(2, 10) + 5,
            direction: WindDirection::Southwest,
        },
        precipitation: Precipitation {
            kind: PrecipKind::None,
            duration_h: 0,
        },
        sky: Sky::PartlyCloudy,
    }
}

/// A fixed weather trace, consumed one day at a time; repeats its last
/// record when exhausted. Used by tests and replays.
pub struct ScriptedWeather {
    days: VecDeque<WeatherRecord>,
    last: WeatherRecord,
}

impl ScriptedWeather {
    pub fn new(days: Vec<WeatherRecord>) -> Self {
        let last = days.last().copied().unwrap_or_else(|| WeatherRecord::fair(25));
        Self {
            days: days.into(),
            last,
        }
    }

    /// The same record every day.
    pub fn constant(record: WeatherRecord) -> Self {
        Self::new(vec![record])
    }
}

impl WeatherAdapter for ScriptedWeather {
    fn generate_day_weather(&mut self, _date: &Date) -> WeatherRecord {
        self.days.pop_front().unwrap_or(self.last)
    }
}

/// A question the engine needs answered before it can continue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum DecisionRequest {
    /// Choose a repair plan, or none to defer.
    Repair {
        damage: u32,
        damage_pct: u32,
        treasury: i64,
        plans: Vec<RepairPlan>,
        recommended: Option<usize>,
    },
    /// Buy cargo from a merchant's offer.
    Purchase {
        offer: CargoOffer,
        recommendation: PurchaseDecision,
    },
    /// Sell the hold here or carry it on.
    Sale { recommendation: SaleDecision },
    /// Sign on hands to cover a shortfall.
    Hiring {
        shortfall_total: u32,
        required_total: u32,
        recommended: bool,
    },
    /// Take paying passengers aboard.
    Passengers { count: u32, revenue: u32 },
    /// Accept a charter commission.
    Charter { charter: Charter },
}

/// The caller's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum DecisionReply {
    /// Index into the offered repair plans; `None` defers.
    Repair { plan: Option<usize> },
    /// Loads to buy; zero declines.
    Purchase { loads: u32 },
    Sale { sell: bool },
    Hiring { hire: bool },
    Passengers { accept: bool },
    Charter { accept: bool },
}

/// User-visible notifications from the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum Notification {
    Info { message: String },
    Error { message: String },
}

/// Presents choices and returns structured replies. Manual adapters ask a
/// person; [`AutoPolicy`] answers from the rulebook.
pub trait DecisionAdapter {
    fn decide(&mut self, request: DecisionRequest) -> DecisionReply;
    fn notify(&mut self, notification: Notification);
}

/// The automated policy: follow the engine's own recommendations.
#[derive(Debug, Default)]
pub struct AutoPolicy {
    pub notifications: Vec<Notification>,
}

impl DecisionAdapter for AutoPolicy {
    fn decide(&mut self, request: DecisionRequest) -> DecisionReply {
        match request {
            DecisionRequest::Repair { recommended, .. } => DecisionReply::Repair { plan: recommended },
            DecisionRequest::Purchase { recommendation, .. } => DecisionReply::Purchase {
                loads: if recommendation.accept { recommendation.loads } else { 0 },
            },
            DecisionRequest::Sale { recommendation } => DecisionReply::Sale {
                sell: recommendation.choice == crate::trading::SaleChoice::Sell,
            },
            DecisionRequest::Hiring { recommended, .. } => DecisionReply::Hiring { hire: recommended },
            DecisionRequest::Passengers { .. } => DecisionReply::Passengers { accept: true },
            DecisionRequest::Charter { .. } => DecisionReply::Charter { accept: true },
        }
    }

    fn notify(&mut self, notification: Notification) {
        match &notification {
            Notification::Info { message } => log::info!("{message}"),
            Notification::Error { message } => log::error!("{message}"),
        }
        self.notifications.push(notification);
    }
}

/// Replies from a fixed queue, falling back to the automated policy;
/// drives manual-mode tests.
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    pub replies: VecDeque<DecisionReply>,
    pub fallback: AutoPolicy,
    pub requests_seen: Vec<DecisionRequest>,
}

impl ScriptedDecisions {
    pub fn new(replies: Vec<DecisionReply>) -> Self {
        Self {
            replies: replies.into(),
            ..Self::default()
        }
    }
}

impl DecisionAdapter for ScriptedDecisions {
    fn decide(&mut self, request: DecisionRequest) -> DecisionReply {
        self.requests_seen.push(request.clone());
        match self.replies.pop_front() {
            Some(reply) => reply,
            None => self.fallback.decide(request),
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.fallback.notify(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trading::SaleChoice;

    #[test]
    fn test_fallback_weather_band() {
        let mut dice = Dice::seeded(7);
        for _ in 0..50 {
            let w = fallback_weather(&mut dice);
            assert!((7..=25).contains(&w.wind.speed_mph));
            assert_eq!(w.sky, Sky::PartlyCloudy);
        }
    }

    #[test]
    fn test_scripted_weather_repeats_last() {
        let mut adapter = ScriptedWeather::new(vec![
            WeatherRecord::fair(10),
            WeatherRecord::fair(40),
        ]);
        let d = Date::default();
        assert_eq!(adapter.generate_day_weather(&d).wind.speed_mph, 10);
        assert_eq!(adapter.generate_day_weather(&d).wind.speed_mph, 40);
        assert_eq!(adapter.generate_day_weather(&d).wind.speed_mph, 40);
    }

    #[test]
    fn test_auto_policy_follows_recommendations() {
        let mut policy = AutoPolicy::default();

        let reply = policy.decide(DecisionRequest::Sale {
            recommendation: SaleDecision {
                choice: SaleChoice::Hold,
                reason: "test".to_string(),
            },
        });
        assert_eq!(reply, DecisionReply::Sale { sell: false });

        let reply = policy.decide(DecisionRequest::Hiring {
            shortfall_total: 5,
            required_total: 12,
            recommended: true,
        });
        assert_eq!(reply, DecisionReply::Hiring { hire: true });
    }

    #[test]
    fn test_scripted_decisions_queue_then_fallback() {
        let mut adapter = ScriptedDecisions::new(vec![DecisionReply::Passengers { accept: false }]);
        let request = DecisionRequest::Passengers {
            count: 3,
            revenue: 120,
        };
        assert_eq!(
            adapter.decide(request.clone()),
            DecisionReply::Passengers { accept: false }
        );
        // Queue exhausted: the auto policy accepts.
        assert_eq!(
            adapter.decide(request),
            DecisionReply::Passengers { accept: true }
        );
    }
}
