//! The append-only voyage event stream.
//!
//! One tagged enum carries everything notable that happens at sea or in
//! port; rendering (JSONL here, HTML elsewhere) is a pure function over
//! the stream and never feeds back into the simulation.
//!
//! ```json
//! {"type":"damage","day":12,"date":"13 Highsail 1372","source":"weather",...}
//! ```

use crate::encounters::{EncounterClass, TimeOfDay};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tradewinds_data::cargo::CargoCategory;
use tradewinds_data::encounters::{FrequencyClass, WaterBody};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageSource {
    Weather,
    Encounter,
    Hazard,
    FailedRepair,
}

/// Events detected while the voyage runs. Append-only; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VoyageEvent {
    /// The hull took damage.
    Damage {
        day: u32,
        date: String,
        source: DamageSource,
        source_name: String,
        hull_damage: u32,
        hull_remaining: u32,
    },

    /// Something was met at sea.
    Encounter {
        day: u32,
        date: String,
        water: WaterBody,
        name: String,
        classification: EncounterClass,
        frequency: FrequencyClass,
        time_of_day: TimeOfDay,
        number: u32,
        distance_yd: u32,
        surprise: bool,
        note: String,
    },

    /// Crew were lost overboard or in a fight.
    CrewLoss {
        day: u32,
        date: String,
        source_name: String,
        count: u32,
    },

    /// Cargo spoiled on a haul past its distance category.
    Spoilage {
        day: u32,
        date: String,
        category: CargoCategory,
        loads_lost: u32,
        loads_remaining: u32,
        note: String,
    },

    /// A threat was driven off or distracted before it could do harm.
    DrivenOff {
        day: u32,
        date: String,
        source_name: String,
        method: String,
    },

    /// A missing capability or deferred action worth surfacing.
    Warning {
        day: u32,
        date: String,
        message: String,
    },

    /// The voyage ended.
    VoyageEnded {
        day: u32,
        date: String,
        outcome: String,
    },
}

/// Write the stream as JSONL to any `Write` destination.
pub fn write_jsonl<W: Write>(events: &[VoyageEvent], mut writer: W) -> std::io::Result<()> {
    for event in events {
        serde_json::to_writer(&mut writer, event)?;
        writeln!(writer)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsonl_tagging() {
        let events = vec![
            VoyageEvent::Damage {
                day: 12,
                date: "13 Highsail 1372".to_string(),
                source: DamageSource::Weather,
                source_name: "gale-force winds".to_string(),
                hull_damage: 6,
                hull_remaining: 14,
            },
            VoyageEvent::CrewLoss {
                day: 14,
                date: "15 Highsail 1372".to_string(),
                source_name: "sea troll".to_string(),
                count: 2,
            },
        ];

        let mut out = Vec::new();
        write_jsonl(&events, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"type\":\"damage\""));
        assert!(lines[0].contains("\"source\":\"weather\""));
        assert!(lines[1].contains("\"type\":\"crew_loss\""));
    }

    #[test]
    fn test_events_round_trip() {
        let event = VoyageEvent::Encounter {
            day: 3,
            date: "4 Highsail 1372".to_string(),
            water: WaterBody::Shallow,
            name: "shark".to_string(),
            classification: EncounterClass::Sighting,
            frequency: FrequencyClass::Common,
            time_of_day: TimeOfDay::Noon,
            number: 7,
            distance_yd: 18,
            surprise: false,
            note: "Spotted shark at 18 yards (noon)".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: VoyageEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
