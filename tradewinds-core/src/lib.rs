//! # Tradewinds Core
//!
//! Deterministic voyage execution engine for a fantasy maritime trading
//! game.
//!
//! Given a ship, a multi-port route, officers, and capital, the engine
//! advances a simulated calendar day by day: weather drives sailing
//! progress, piloting checks resolve storm hazards, encounter tables
//! produce sea monsters and pirates, and every port call runs fees,
//! repairs, hiring, passengers, and the cargo market. The voyage ends
//! with a structured report whose ledger reconstructs the treasury
//! entry by entry.
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  adapters  │──▶│ VoyageEngine │──▶│ VoyageState  │
//! │ (weather,  │   │ (day / port  │   │ (ledger,     │
//! │ decisions) │   │  state machine)│ │  events, log)│
//! └────────────┘   └──────┬───────┘   └──────┬───────┘
//!                         │                  │
//!                  ┌──────▼───────┐   ┌──────▼───────┐
//!                  │ rule modules │   │ VoyageReport │
//!                  │ C1-C7        │   │ (pure view)  │
//!                  └──────────────┘   └──────────────┘
//! ```
//!
//! ## Key types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`VoyageEngine`] | Owns one voyage; `simulate_day` / `run_to_completion` |
//! | [`VoyageState`] | The whole aggregate, serializable and resumable |
//! | [`VoyageConfig`] | Validated input record |
//! | [`Dice`] | Seedable dice stream; all randomness flows through it |
//! | [`VoyageReport`] | Structured output for journals and summaries |
//!
//! Determinism: a voyage is replayable from `(seed, config, decisions,
//! weather trace)`. The dice state rides inside [`VoyageState`] so a
//! saved voyage resumes mid-stream.

pub mod adapters;
pub mod config;
pub mod dice;
pub mod encounters;
pub mod events;
pub mod market;
pub mod port;
pub mod proficiency;
pub mod report;
pub mod state;
pub mod step;
pub mod store;
pub mod testing;
pub mod trading;
pub mod weather;

pub use adapters::{
    AutoPolicy, DecisionAdapter, DecisionReply, DecisionRequest, Notification, ScriptedWeather,
    WeatherAdapter,
};
pub use config::{ConfigError, TradeMode, VoyageConfig, VoyageMode};
pub use dice::{Dice, DiceError};
pub use events::VoyageEvent;
pub use proficiency::{Abilities, CheckResult, CrewQuality, Officer, Skill};
pub use report::VoyageReport;
pub use state::{VoyagePhase, VoyageState};
pub use step::{EngineError, VoyageEngine};
pub use store::{JsonFileStore, MemoryStore, StateStore, StoreError};
