//! The structured voyage report.
//!
//! A pure projection of the final state; the HTML journal and any other
//! presentation render from this record outside the core.

use crate::events::VoyageEvent;
use crate::state::{
    Breakdown, Hull, LedgerEntry, PassengerRecord, PortActivity, RepairLogEntry, VoyagePhase,
    VoyageState,
};
use serde::{Deserialize, Serialize};
use tradewinds_data::calendar::Date;
use tradewinds_data::ports::PortId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoyageReport {
    pub voyage_id: String,
    pub outcome: String,
    pub ship: String,
    pub ship_type: String,
    pub route: String,
    pub captain: String,
    pub lieutenant: Option<String>,
    pub start_date: Date,
    pub end_date: Date,
    pub total_days: u32,
    pub total_distance: u32,
    pub final_hull: Hull,
    pub starting_capital: u32,
    pub treasury: i64,
    pub revenue_total: u32,
    pub expense_total: u32,
    pub crew_earnings_from_trade: u32,
    pub breakdown: Breakdown,
    pub ports_visited: Vec<PortId>,
    pub port_activities: Vec<PortActivity>,
    pub repair_log: Vec<RepairLogEntry>,
    pub passenger_manifest: Vec<PassengerRecord>,
    pub ledger: Vec<LedgerEntry>,
    pub events: Vec<VoyageEvent>,
}

impl VoyageReport {
    pub fn from_state(state: &VoyageState) -> Self {
        let outcome = match state.phase {
            VoyagePhase::Final => "completed".to_string(),
            VoyagePhase::Failed => "failed".to_string(),
            _ => "in progress".to_string(),
        };
        Self {
            voyage_id: state.id.clone(),
            outcome,
            ship: state.ship.name.clone(),
            ship_type: state.ship.ship_type.clone(),
            route: state.route.name.clone(),
            captain: state.captain.name.clone(),
            lieutenant: state.lieutenant.as_ref().map(|lt| lt.name.clone()),
            start_date: state.start_date,
            end_date: state.date,
            total_days: state.total_days,
            total_distance: state.total_distance,
            final_hull: state.ship.hull,
            starting_capital: state.starting_capital,
            treasury: state.treasury,
            revenue_total: state.revenue_total,
            expense_total: state.expense_total,
            crew_earnings_from_trade: state.crew_earnings_from_trade,
            breakdown: state.breakdown,
            ports_visited: state.ports_visited.clone(),
            port_activities: state.port_activities.clone(),
            repair_log: state.repair_log.clone(),
            passenger_manifest: state.passenger_manifest.clone(),
            ledger: state.ledger.clone(),
            events: state.events.clone(),
        }
    }

    /// A short human summary for logs and completion notices.
    pub fn summary(&self) -> String {
        let net = self.treasury - self.starting_capital as i64;
        format!(
            "{} ({}) {} '{}' in {} days, {} miles: {} gp net, hull {}/{}",
            self.ship,
            self.captain,
            self.outcome,
            self.route,
            self.total_days,
            self.total_distance,
            net,
            self.final_hull.value,
            self.final_hull.max,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CostCategory;
    use crate::testing::VoyageStateBuilder;

    #[test]
    fn test_report_mirrors_state() {
        let mut state = VoyageStateBuilder::new().gold(2000).build();
        state.open_ledger();
        state.record_expense("Port fees", 50, CostCategory::Fees);
        state.record_income("Passenger fares", 120);
        state.phase = VoyagePhase::Final;

        let report = VoyageReport::from_state(&state);
        assert_eq!(report.outcome, "completed");
        assert_eq!(report.treasury, state.treasury);
        assert_eq!(report.ledger.len(), 3);
        assert_eq!(report.revenue_total, 120);
        assert_eq!(report.expense_total, 50);
        assert!(report.summary().contains("completed"));
    }

    #[test]
    fn test_report_serializes() {
        let state = VoyageStateBuilder::new().build();
        let report = VoyageReport::from_state(&state);
        let json = serde_json::to_string_pretty(&report).unwrap();
        let back: VoyageReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
