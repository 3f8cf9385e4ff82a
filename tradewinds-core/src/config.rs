//! Voyage configuration and validation.
//!
//! A bad configuration is surfaced before the voyage starts; nothing is
//! mutated on failure.

use crate::proficiency::{CrewQuality, Officer};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tradewinds_data::calendar::Date;
use tradewinds_data::defines::trading;
use tradewinds_data::Registries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoyageMode {
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeMode {
    /// Buy on the owner's account; profit split with the crew.
    Speculation,
    /// Contract freight for a fixed transport fee and crew commission.
    Consignment,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown ship template: {0}")]
    UnknownShip(String),
    #[error("unknown route: {0}")]
    UnknownRoute(String),
    #[error("route {route} has no passage from {from} to {to}")]
    BrokenRoute {
        route: String,
        from: String,
        to: String,
    },
    #[error("commission rate {0}% is outside {min}..={max}", min = trading::COMMISSION_MIN_PCT, max = trading::COMMISSION_MAX_PCT)]
    CommissionOutOfRange(u32),
    #[error("commission rate is only meaningful for consignment voyages")]
    CommissionWithoutConsignment,
    #[error("captain has no name")]
    CaptainUnnamed,
    #[error("{officer} has an ability score outside 3..=18")]
    AbilityOutOfRange { officer: String },
}

/// Everything needed to start a voyage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoyageConfig {
    pub ship_id: String,
    pub route_id: String,
    pub mode: VoyageMode,
    pub captain: Officer,
    pub lieutenant: Option<Officer>,
    pub starting_gold: u32,
    pub trade_mode: TradeMode,
    /// Crew commission on consigned sales, percent. Only for consignment.
    pub commission_rate_pct: Option<u32>,
    pub latitude: f64,
    pub longitude: f64,
    pub auto_repair: bool,
    pub enable_rowing: bool,
    pub automate_trading: bool,
    pub start_date: Date,
    pub crew_quality: CrewQuality,
}

impl VoyageConfig {
    /// A runnable default: the cog on the Amber Run in auto mode.
    pub fn example() -> Self {
        use crate::proficiency::{Abilities, Skill};
        Self {
            ship_id: "cog".to_string(),
            route_id: "amber-run".to_string(),
            mode: VoyageMode::Auto,
            captain: Officer::new(
                "Aldra Voss",
                Abilities {
                    strength: 11,
                    dexterity: 12,
                    constitution: 13,
                    intelligence: 14,
                    wisdom: 13,
                    charisma: 15,
                },
                &[
                    Skill::Piloting,
                    Skill::Navigation,
                    Skill::Bargaining,
                    Skill::Appraising,
                    Skill::Trading,
                    Skill::Seamanship,
                ],
            ),
            lieutenant: None,
            starting_gold: 5000,
            trade_mode: TradeMode::Speculation,
            commission_rate_pct: None,
            latitude: 42.0,
            longitude: -8.5,
            auto_repair: true,
            enable_rowing: false,
            automate_trading: true,
            start_date: Date::default(),
            crew_quality: CrewQuality::Average,
        }
    }

    pub fn validate(&self, data: &Registries) -> Result<(), ConfigError> {
        if data.ships.template(&self.ship_id).is_none() {
            return Err(ConfigError::UnknownShip(self.ship_id.clone()));
        }
        let Some(route) = data.ports.route(&self.route_id) else {
            return Err(ConfigError::UnknownRoute(self.route_id.clone()));
        };

        for pair in route.ports.windows(2) {
            if data.ports.passage(&pair[0], &pair[1]).is_none() {
                return Err(ConfigError::BrokenRoute {
                    route: route.id.clone(),
                    from: pair[0].clone(),
                    to: pair[1].clone(),
                });
            }
        }
        if route.circuit {
            let last = route.ports.last().expect("route has ports");
            if data.ports.passage(last, &route.ports[0]).is_none() {
                return Err(ConfigError::BrokenRoute {
                    route: route.id.clone(),
                    from: last.clone(),
                    to: route.ports[0].clone(),
                });
            }
        }

        match (self.trade_mode, self.commission_rate_pct) {
            (TradeMode::Consignment, Some(rate)) => {
                if !(trading::COMMISSION_MIN_PCT..=trading::COMMISSION_MAX_PCT).contains(&rate) {
                    return Err(ConfigError::CommissionOutOfRange(rate));
                }
            }
            (TradeMode::Consignment, None) => {
                return Err(ConfigError::CommissionOutOfRange(0));
            }
            (TradeMode::Speculation, Some(_)) => {
                return Err(ConfigError::CommissionWithoutConsignment);
            }
            (TradeMode::Speculation, None) => {}
        }

        if self.captain.name.trim().is_empty() {
            return Err(ConfigError::CaptainUnnamed);
        }
        if !self.captain.abilities.all_in_range() {
            return Err(ConfigError::AbilityOutOfRange {
                officer: self.captain.name.clone(),
            });
        }
        if let Some(lt) = &self.lieutenant {
            if !lt.abilities.all_in_range() {
                return Err(ConfigError::AbilityOutOfRange {
                    officer: lt.name.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_validates() {
        let data = Registries::builtin();
        assert!(VoyageConfig::example().validate(&data).is_ok());
    }

    #[test]
    fn test_unknown_ids_rejected() {
        let data = Registries::builtin();
        let mut config = VoyageConfig::example();
        config.ship_id = "dreadnought".to_string();
        assert!(matches!(
            config.validate(&data),
            Err(ConfigError::UnknownShip(_))
        ));

        let mut config = VoyageConfig::example();
        config.route_id = "northwest-passage".to_string();
        assert!(matches!(
            config.validate(&data),
            Err(ConfigError::UnknownRoute(_))
        ));
    }

    #[test]
    fn test_commission_rules() {
        let data = Registries::builtin();

        let mut config = VoyageConfig::example();
        config.trade_mode = TradeMode::Consignment;
        config.commission_rate_pct = Some(25);
        assert!(config.validate(&data).is_ok());

        config.commission_rate_pct = Some(50);
        assert!(matches!(
            config.validate(&data),
            Err(ConfigError::CommissionOutOfRange(50))
        ));

        let mut config = VoyageConfig::example();
        config.commission_rate_pct = Some(25);
        assert!(matches!(
            config.validate(&data),
            Err(ConfigError::CommissionWithoutConsignment)
        ));
    }

    #[test]
    fn test_officer_validation() {
        let data = Registries::builtin();

        let mut config = VoyageConfig::example();
        config.captain.name = "  ".to_string();
        assert!(matches!(
            config.validate(&data),
            Err(ConfigError::CaptainUnnamed)
        ));

        let mut config = VoyageConfig::example();
        config.captain.abilities.wisdom = 19;
        assert!(matches!(
            config.validate(&data),
            Err(ConfigError::AbilityOutOfRange { .. })
        ));
    }
}
