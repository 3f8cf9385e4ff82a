//! Test support: build voyage states without running the engine.

use crate::config::{TradeMode, VoyageMode};
use crate::proficiency::{Abilities, CrewQuality, Officer, Skill};
use crate::state::{
    Breakdown, CurrentCargo, Leg, ShipInstance, VoyagePhase, VoyageState,
};
use tradewinds_data::calendar::Date;
use tradewinds_data::Registries;

/// Builds a plausible mid-voyage state with every knob overridable.
pub struct VoyageStateBuilder {
    state: VoyageState,
}

impl VoyageStateBuilder {
    pub fn new() -> Self {
        let data = Registries::builtin();
        let template = data.ships.template("cog").expect("builtin cog");
        let route = data.ports.route("amber-run").expect("builtin route").clone();
        let legs: Vec<Leg> = route
            .ports
            .windows(2)
            .map(|pair| {
                let passage = data.ports.passage(&pair[0], &pair[1]).expect("connected");
                Leg {
                    from: pair[0].clone(),
                    to: pair[1].clone(),
                    distance_mi: passage.distance_mi,
                    water: passage.water,
                }
            })
            .collect();

        let captain = Officer::new(
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
            ],
        );

        let start_date = Date::default();
        let leg_remaining_mi = legs[0].distance_mi;
        let state = VoyageState {
            id: "test-voyage".to_string(),
            ship: ShipInstance::from_template(template),
            template_id: template.id.clone(),
            route,
            legs,
            captain,
            lieutenant: None,
            trade_mode: TradeMode::Speculation,
            commission_rate_pct: 0,
            crew_quality: CrewQuality::Average,
            mode: VoyageMode::Auto,
            auto_repair: true,
            enable_rowing: false,
            automate_trading: true,
            start_date,
            date: start_date,
            phase: VoyagePhase::Sailing { leg: 0 },
            treasury: 0,
            starting_capital: 0,
            crew_earnings_from_trade: 0,
            revenue_total: 0,
            expense_total: 0,
            daily_operational_cost: 0,
            leg_accumulated_cost: 0,
            breakdown: Breakdown::default(),
            cargo: CurrentCargo::empty(),
            consignment: None,
            total_days: 0,
            total_distance: 0,
            total_hull_damage: 0,
            consecutive_rowing_days: 0,
            leg_remaining_mi,
            temp_repairs: Vec::new(),
            events: Vec::new(),
            ports_visited: vec!["saltmere".to_string()],
            port_activities: Vec::new(),
            ledger: Vec::new(),
            repair_log: Vec::new(),
            passenger_manifest: Vec::new(),
            at_sea: true,
            in_port: false,
            finished: false,
            last_port_id: Some("saltmere".to_string()),
            rng_seed: 1,
            rng_state: 1,
        };
        Self { state }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.state.id = id.to_string();
        self
    }

    pub fn ship(mut self, ship: ShipInstance) -> Self {
        self.state.ship = ship;
        self
    }

    pub fn captain(mut self, captain: Officer) -> Self {
        self.state.captain = captain;
        self
    }

    pub fn gold(mut self, gold: u32) -> Self {
        self.state.starting_capital = gold;
        self.state.treasury = gold as i64;
        self
    }

    pub fn trade_mode(mut self, mode: TradeMode) -> Self {
        self.state.trade_mode = mode;
        self
    }

    pub fn phase(mut self, phase: VoyagePhase) -> Self {
        self.state.phase = phase;
        self
    }

    pub fn build(self) -> VoyageState {
        self.state
    }
}

impl Default for VoyageStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_are_coherent() {
        let state = VoyageStateBuilder::new().build();
        assert_eq!(state.legs.len(), state.route.ports.len() - 1);
        assert_eq!(state.leg_remaining_mi, state.legs[0].distance_mi);
        assert!(state.cargo.is_empty());
    }

    #[test]
    fn test_builder_overrides() {
        let state = VoyageStateBuilder::new().id("abc").gold(2500).build();
        assert_eq!(state.id, "abc");
        assert_eq!(state.treasury, 2500);
        assert_eq!(state.starting_capital, 2500);
    }
}
