//! Rule constants (defines).
//!
//! Gathered in one place so the engine systems read like the rulebook.
//! All monetary constants are gold pieces; all distances are miles.

/// Sailing and propulsion
pub mod sailing {
    /// Miles per day contributed by one point of ship movement.
    pub const MILES_PER_MOVEMENT: u32 = 8;

    /// Wind below this is a dead calm; the ship is becalmed.
    pub const BECALMED_BELOW_MPH: u32 = 5;

    /// Wind band with full base speed.
    pub const FAIR_WIND_LOW_MPH: u32 = 20;
    pub const FAIR_WIND_HIGH_MPH: u32 = 30;

    /// Rowing makes this much headway regardless of ship size.
    pub const ROWING_MILES_PER_DAY: u32 = 8;

    /// Oar crews tire after this many consecutive rowing days; speed halves.
    pub const ROWING_FATIGUE_DAYS: u32 = 3;

    /// At this hull-damage percentage the ship can no longer make way.
    pub const DEAD_IN_WATER_PCT: u32 = 75;
}

/// Crew wages, gp per month. Lieutenants are paid by level.
pub mod wages {
    pub const SAILOR: u32 = 2;
    pub const OARSMAN: u32 = 5;
    pub const MARINE: u32 = 3;
    pub const MATE: u32 = 30;
    pub const LIEUTENANT_PER_LEVEL: u32 = 100;
}

/// Provisioning
pub mod food {
    /// 7 gp per week feeds five crew; 1 gp per five souls per day.
    pub const GP_PER_FIVE_SOULS_PER_DAY: u32 = 1;

    /// Share of the daily operational cost attributed to food in the
    /// expense breakdown.
    pub const BREAKDOWN_RATIO_PCT: u32 = 30;
}

/// Port fees
pub mod fees {
    /// Entrance fee is 1d10 + this.
    pub const ENTRANCE_BASE: u32 = 10;

    /// Anchoring out costs this flat rate per day.
    pub const ANCHOR_PER_DAY: u32 = 5;

    /// A berth is free on the quay on 1d100 <= this.
    pub const BERTH_AVAILABLE_PCT: u32 = 80;

    /// Ships at or under this hull size always take a berth when one is free.
    pub const SMALL_SHIP_HULL_MAX: u32 = 5;
}

/// Repairs
pub mod repair {
    pub const PROFESSIONAL_COST_PER_POINT: u32 = 100;
    pub const SELF_COST_PER_POINT: u32 = 50;

    /// Drydock compresses repair time to this fraction of the damage, in
    /// hundredths (60 => ceil(damage * 0.6) days).
    pub const DRYDOCK_TIME_PCT: u32 = 60;

    /// Auto mode repairs when damage reaches this percentage of max hull.
    pub const AUTO_REPAIR_AT_PCT: u32 = 10;
}

/// Trading thresholds
pub mod trading {
    /// Distance-category breakpoints, miles.
    pub const SHORT_MILES: u32 = 80;
    pub const MEDIUM_MILES: u32 = 250;
    pub const LONG_MILES: u32 = 500;

    /// Treasury kept back from a purchase, by confidence tier (percent).
    pub const RESERVE_EXTRAORDINARY_PCT: u32 = 20;
    pub const RESERVE_MEDIUM_PCT: u32 = 30;
    pub const RESERVE_SHORT_PCT: u32 = 50;

    /// Transport fee: 40 gp per 500-mile block per two loads, 100 gp floor.
    pub const TRANSPORT_FEE_PER_BLOCK: u32 = 40;
    pub const TRANSPORT_FEE_MIN: u32 = 100;
    pub const TRANSPORT_BLOCK_MILES: u32 = 500;

    /// Consignment commission bounds, percent of sale value.
    pub const COMMISSION_MIN_PCT: u32 = 10;
    pub const COMMISSION_MAX_PCT: u32 = 40;

    /// Passenger fare: 20 gp per 500-mile block of remaining route.
    pub const PASSAGE_FARE_PER_BLOCK: u32 = 20;

    /// Charter opportunity chance, percent per port visit.
    pub const CHARTER_CHANCE_PCT: u32 = 5;

    /// Smuggling is only worth attempting above this estimated tax.
    pub const SMUGGLE_MIN_TAX: u32 = 500;

    /// ...and only with a smuggling target at least this good.
    pub const SMUGGLE_MIN_TARGET: i32 = 12;
}

/// Encounter mechanics
pub mod encounters {
    /// An encounter happens on a d20 roll of 1 at each scheduled check.
    pub const TRIGGER_ROLL: u32 = 1;

    /// Frequency class bands on d100.
    pub const COMMON_MAX: u32 = 65;
    pub const UNCOMMON_MAX: u32 = 85;
    pub const RARE_MAX: u32 = 97;

    /// Base surprise chance, N-in-6.
    pub const BASE_SURPRISE_IN_6: u32 = 2;

    /// Large/gargantuan creatures turn aggressive this often (percent).
    pub const AGGRESSION_PCT: u32 = 15;

    /// Flaming oil drives off an unintelligent threat on d100 <= this.
    pub const FLAMING_OIL_PCT: u32 = 75;
    pub const FLAMING_OIL_BURNING_PCT: u32 = 90;

    /// Thrown food ends an encounter on d100 <= this.
    pub const FOOD_DISTRACTION_PCT: u32 = 50;

    /// Crew are only at risk from creatures this strong (total hit dice).
    pub const CREW_RISK_MIN_HD: u32 = 6;

    /// Base capsize chance against gargantuan or capsizing creatures.
    pub const CAPSIZE_BASE_PCT: i32 = 10;
}
