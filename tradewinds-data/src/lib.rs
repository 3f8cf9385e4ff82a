//! Static reference data for the Tradewinds voyage simulator.
//!
//! Everything in this crate is immutable after construction: the engine
//! receives read-only handles and never mutates a registry. Runtime state
//! (ship instances, cargo holds, treasuries) lives in `tradewinds-core`.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`calendar`] | The 16-month calendar and [`calendar::Date`] arithmetic |
//! | [`ports`] | Ports, passages between them, and named routes |
//! | [`ships`] | Ship templates and crew complements |
//! | [`cargo`] | Cargo categories, base values, sale-adjustment tables |
//! | [`encounters`] | Sea encounter tables per water body and frequency |
//! | [`defines`] | Rule constants (wages, fees, sailing, trading) |

pub mod calendar;
pub mod cargo;
pub mod defines;
pub mod encounters;
pub mod ports;
pub mod ships;

pub use calendar::Date;
pub use cargo::CargoCategory;
pub use encounters::{EncounterEntry, FrequencyClass, SizeClass, WaterBody};
pub use ports::{PortDef, PortId, PortRegistry, PortSize, RouteDef};
pub use ships::{CrewComplement, CrewRole, ShipTemplate};

/// All reference registries bundled for injection into the engine.
#[derive(Debug, Clone)]
pub struct Registries {
    pub ports: ports::PortRegistry,
    pub ships: ships::ShipRegistry,
}

impl Registries {
    /// The built-in Amber Coast data set.
    pub fn builtin() -> Self {
        Self {
            ports: ports::PortRegistry::builtin(),
            ships: ships::ShipRegistry::builtin(),
        }
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::builtin()
    }
}
