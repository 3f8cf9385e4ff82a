//! The sixteen-month calendar used across the Amber Coast.
//!
//! Every month has 30 days, giving a 480-day year. This keeps date
//! arithmetic exact for the simulation; there are no leap rules.

use serde::{Deserialize, Serialize};

/// Month names in calendar order.
pub const MONTH_NAMES: [&str; 16] = [
    "Deepwinter",
    "Icewane",
    "Thawmarch",
    "Seedtide",
    "Rainmoon",
    "Blossomgale",
    "Brightsun",
    "Highsail",
    "Midsummer",
    "Emberwane",
    "Harvestide",
    "Goldleaf",
    "Mistfall",
    "Frostmarch",
    "Longnight",
    "Yearsend",
];

pub const MONTHS_PER_YEAR: u32 = 16;
pub const DAYS_PER_MONTH: u32 = 30;
pub const DAYS_PER_YEAR: u32 = MONTHS_PER_YEAR * DAYS_PER_MONTH;

/// A calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Date {
    pub year: i32,
    /// 1-16
    pub month: u8,
    /// 1-30
    pub day: u8,
}

impl Date {
    pub fn new(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// The month's name, or `"?"` for an out-of-range month field.
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("?")
    }

    /// Adds days to the current date.
    pub fn add_days(&self, days: u32) -> Self {
        let mut d = self.day as u32 + days;
        let mut m = self.month as u32;
        let mut y = self.year;

        while d > DAYS_PER_MONTH {
            d -= DAYS_PER_MONTH;
            m += 1;
            if m > MONTHS_PER_YEAR {
                m -= MONTHS_PER_YEAR;
                y += 1;
            }
        }

        Self {
            year: y,
            month: m as u8,
            day: d as u8,
        }
    }

    /// Total days from year 0, Deepwinter 1. Used for durations and
    /// repair-expiry bookkeeping.
    pub fn days_from_epoch(&self) -> i64 {
        self.year as i64 * DAYS_PER_YEAR as i64
            + (self.month as i64 - 1) * DAYS_PER_MONTH as i64
            + (self.day as i64 - 1)
    }

    /// Whole days elapsed since `other` (negative if `other` is later).
    pub fn days_since(&self, other: &Date) -> i64 {
        self.days_from_epoch() - other.days_from_epoch()
    }

    /// Whole 30-day months elapsed since `other`.
    pub fn months_since(&self, other: &Date) -> i64 {
        self.days_since(other) / DAYS_PER_MONTH as i64
    }
}

impl Default for Date {
    fn default() -> Self {
        Self::new(1372, 8, 1)
    }
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.day, self.month_name(), self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_days_within_month() {
        let d = Date::new(1372, 8, 1).add_days(10);
        assert_eq!(d, Date::new(1372, 8, 11));
    }

    #[test]
    fn test_add_days_across_month_and_year() {
        let d = Date::new(1372, 16, 29).add_days(2);
        assert_eq!(d, Date::new(1373, 1, 1));
    }

    #[test]
    fn test_days_since() {
        let start = Date::new(1372, 8, 1);
        let end = start.add_days(95);
        assert_eq!(end.days_since(&start), 95);
        assert_eq!(end.months_since(&start), 3);
    }

    #[test]
    fn test_display_uses_month_name() {
        let d = Date::new(1372, 8, 12);
        assert_eq!(d.to_string(), "12 Highsail 1372");
    }
}
