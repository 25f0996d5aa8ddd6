//! Parking record types shared by the interactive and CSV entry tools.
//!
//! Field order matters: the map client reads `parking_data.json` as-is, so
//! structs serialize in the exact key order that file has always used, and
//! absent values are emitted as explicit `null`s.

use serde::{Deserialize, Serialize};

/// Latitude/longitude pair, serialized as a 2-element JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords(pub f64, pub f64);

/// Sentinel stored when coordinates could not be resolved.
pub const UNRESOLVED_COORDS: Coords = Coords(0.0, 0.0);

/// One billing window: a half-open "HH:MM" time range with its price per
/// billing unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateWindow {
    pub start: String,
    pub end: String,
    pub price: u32,
    pub unit_minutes: u32,
}

/// Price and billing granularity before a time window is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate {
    pub price: u32,
    pub unit_minutes: u32,
}

/// Pricing for one day class (weekday or weekend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    pub day: RateWindow,
    pub night: RateWindow,
    pub max: Option<u32>,
    pub max_desc: Option<String>,
    pub max2: Option<u32>,
    pub max2_desc: Option<String>,
}

impl Tariff {
    /// Build the day and night windows from the shared day window bounds.
    /// The night window mirrors the day window, so the two always partition
    /// the full 24 hours.
    pub fn new(day_start: &str, day_end: &str, day: Rate, night: Rate) -> Self {
        Tariff {
            day: RateWindow {
                start: day_start.to_string(),
                end: day_end.to_string(),
                price: day.price,
                unit_minutes: day.unit_minutes,
            },
            night: RateWindow {
                start: day_end.to_string(),
                end: day_start.to_string(),
                price: night.price,
                unit_minutes: night.unit_minutes,
            },
            max: None,
            max_desc: None,
            max2: None,
            max2_desc: None,
        }
    }

    /// Attach up to two cap tiers. A description is kept only when its cap
    /// is present; a present cap with an empty description stays an empty
    /// string, which the map client renders as a bare cap.
    pub fn with_caps(
        mut self,
        max: Option<u32>,
        max_desc: Option<String>,
        max2: Option<u32>,
        max2_desc: Option<String>,
    ) -> Self {
        self.max = max;
        self.max_desc = max.and(max_desc);
        self.max2 = max2;
        self.max2_desc = max2.and(max2_desc);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStructure {
    pub weekday: Tariff,
    pub weekend: Tariff,
}

/// One parking lot entry in the JSON store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingRecord {
    pub id: u32,
    pub name: String,
    pub coords: Coords,
    pub distance: String,
    pub capacity: Option<String>,
    pub price_structure: PriceStructure,
    pub note: Option<String>,
}

/// Every fall-back value shared by the two entry paths. Both builders read
/// from here so the interactive tool and the CSV importer cannot drift apart.
#[derive(Debug, Clone)]
pub struct Defaults {
    pub day_start: &'static str,
    pub day_end: &'static str,
    pub weekday_day: Rate,
    pub night: Rate,
    pub weekend_day_price: u32,
    /// Suggested first-tier cap in the interactive prompt.
    pub cap_suggestion: u32,
    pub cap_desc: &'static str,
    pub cap2_suggestion: u32,
    pub cap2_desc: &'static str,
    /// Suggested cap when weekend pricing is entered on its own.
    pub weekend_cap_suggestion: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            day_start: "08:00",
            day_end: "22:00",
            weekday_day: Rate { price: 200, unit_minutes: 30 },
            night: Rate { price: 100, unit_minutes: 60 },
            weekend_day_price: 300,
            cap_suggestion: 1200,
            cap_desc: "24時間",
            cap2_suggestion: 800,
            cap2_desc: "5時間",
            weekend_cap_suggestion: 1500,
        }
    }
}
