//! Weather to motion: sailing speed, hazard classification, hazard damage.
//!
//! Speed and hazard classification are pure functions of the day's weather
//! record and the ship's base speed; only the wet-sails bonus and the
//! damage tables draw dice.

use crate::dice::Dice;
use serde::{Deserialize, Serialize};
use tradewinds_data::defines::sailing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Temperature {
    pub high: i32,
    pub low: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindDirection {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wind {
    pub speed_mph: u32,
    pub direction: WindDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecipKind {
    None,
    Drizzle,
    LightRainstorm,
    HeavyRainstorm,
    Hailstorm,
    Snowstorm,
    Thunderstorm,
    TropicalStorm,
    Gale,
    Hurricane,
}

impl PrecipKind {
    /// Rain on the canvas tautens it; these kinds earn the wet-sails bonus.
    fn wets_sails(&self) -> bool {
        matches!(
            self,
            PrecipKind::Drizzle
                | PrecipKind::LightRainstorm
                | PrecipKind::HeavyRainstorm
                | PrecipKind::Hailstorm
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precipitation {
    pub kind: PrecipKind,
    pub duration_h: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sky {
    Clear,
    PartlyCloudy,
    Overcast,
    Fog,
    HeavyFog,
}

/// One day's parsed weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub temperature: Temperature,
    pub wind: Wind,
    pub precipitation: Precipitation,
    pub sky: Sky,
}

impl WeatherRecord {
    /// A plain sailing day at the given wind speed.
    pub fn fair(speed_mph: u32) -> Self {
        Self {
            temperature: Temperature { high: 68, low: 55 },
            wind: Wind {
                speed_mph,
                direction: WindDirection::Southwest,
            },
            precipitation: Precipitation {
                kind: PrecipKind::None,
                duration_h: 0,
            },
            sky: Sky::PartlyCloudy,
        }
    }
}

/// Result of the day's propulsion calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SailingSpeed {
    pub miles: u32,
    pub becalmed: bool,
    pub wet_sails_bonus: u32,
    pub note: String,
}

/// Sailing speed for the day from the wind band, before hull-damage
/// penalties. `base_speed` is `movement * 8` miles per day.
pub fn sailing_speed(dice: &mut Dice, weather: &WeatherRecord, base_speed: u32) -> SailingSpeed {
    let wind = weather.wind.speed_mph;

    if wind < sailing::BECALMED_BELOW_MPH {
        return SailingSpeed {
            miles: 0,
            becalmed: true,
            wet_sails_bonus: 0,
            note: format!("Becalmed: {wind} mph of wind will not fill the sails"),
        };
    }

    let mut speed = if wind < sailing::FAIR_WIND_LOW_MPH {
        // Light air: lose 8 miles per full 10 mph short of fair wind.
        let shortfall = (sailing::FAIR_WIND_LOW_MPH - wind) / 10;
        (base_speed as i64 - 8 * shortfall as i64).max(1) as u32
    } else if wind <= sailing::FAIR_WIND_HIGH_MPH {
        base_speed
    } else {
        // Strong following winds: gain 16 miles per full 10 mph over 30.
        base_speed + 16 * ((wind - sailing::FAIR_WIND_HIGH_MPH) / 10)
    };

    let mut wet_sails_bonus = 0;
    if weather.precipitation.kind.wets_sails() {
        let u = dice.range(5, 10);
        wet_sails_bonus = speed * u / 100;
        speed += wet_sails_bonus;
    }

    SailingSpeed {
        miles: speed,
        becalmed: false,
        wet_sails_bonus,
        note: format!("{wind} mph wind, making {speed} miles"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardSeverity {
    Minor,
    Major,
    Critical,
}

impl std::fmt::Display for HazardSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HazardSeverity::Minor => "Minor",
            HazardSeverity::Major => "Major",
            HazardSeverity::Critical => "Critical",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SailingHazard {
    pub severity: HazardSeverity,
    /// Penalty added to the piloting roll.
    pub piloting_modifier: i32,
    pub description: String,
}

/// Classify the day's weather as a piloting hazard, if it is one.
///
/// Storm severity and fog compose: fog adds +3 (+6 heavy) to whatever the
/// wind demands. Fog alone is a minor hazard.
pub fn classify_hazard(weather: &WeatherRecord) -> Option<SailingHazard> {
    let wind = weather.wind.speed_mph;
    let kind = weather.precipitation.kind;

    let storm = if kind == PrecipKind::Hurricane || wind >= 75 {
        Some((HazardSeverity::Critical, 10, "hurricane-force winds"))
    } else if kind == PrecipKind::Gale || wind >= 50 {
        Some((HazardSeverity::Major, 5, "gale-force winds"))
    } else if matches!(kind, PrecipKind::Thunderstorm | PrecipKind::TropicalStorm) || wind >= 30 {
        Some((HazardSeverity::Minor, 2, "storm winds"))
    } else {
        None
    };

    let fog = match weather.sky {
        Sky::Fog => Some((3, "fog")),
        Sky::HeavyFog => Some((6, "heavy fog")),
        _ => None,
    };

    match (storm, fog) {
        (Some((severity, modifier, what)), Some((fog_mod, fog_what))) => Some(SailingHazard {
            severity,
            piloting_modifier: modifier + fog_mod,
            description: format!("{what} and {fog_what}"),
        }),
        (Some((severity, modifier, what)), None) => Some(SailingHazard {
            severity,
            piloting_modifier: modifier,
            description: what.to_string(),
        }),
        (None, Some((fog_mod, fog_what))) => Some(SailingHazard {
            severity: HazardSeverity::Minor,
            piloting_modifier: fog_mod,
            description: fog_what.to_string(),
        }),
        (None, None) => None,
    }
}

/// Hull damage for a failed piloting check, by severity and miss margin.
pub fn hazard_damage(dice: &mut Dice, severity: HazardSeverity, miss_margin: u32) -> u32 {
    use HazardSeverity::*;
    match (severity, miss_margin) {
        (_, 0) => 0,
        (Minor, 1..=2) => 1,
        (Minor, 3..=4) => dice.roll_die(3) + 1,
        (Minor, _) => dice.roll_die(4) + 2,
        (Major, 1..=2) => 1,
        (Major, 3..=4) => dice.roll_die(3) + 1,
        (Major, _) => dice.roll_die(5) + 3,
        (Critical, 1..=2) => dice.roll_die(3) + 1,
        (Critical, 3..=4) => dice.roll_die(4) + 2,
        (Critical, 5..=7) => dice.roll_die(5) + 3,
        (Critical, _) => dice.roll_die(6) + 4,
    }
}

/// Percentage knocked off the day's speed by accumulated hull damage.
pub fn speed_penalty_pct(damage_pct: u32) -> u32 {
    10 * (damage_pct / 10)
}

/// A ship at three-quarters damage can no longer make way.
pub fn dead_in_water(damage_pct: u32) -> bool {
    damage_pct >= sailing::DEAD_IN_WATER_PCT
}

/// Miles made under oars, halved once the rowers are fatigued.
pub fn rowing_speed(consecutive_rowing_days: u32) -> u32 {
    if consecutive_rowing_days > sailing::ROWING_FATIGUE_DAYS {
        sailing::ROWING_MILES_PER_DAY / 2
    } else {
        sailing::ROWING_MILES_PER_DAY
    }
}
