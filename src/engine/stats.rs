use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stat deltas as they appear in content: stat name to signed change.
/// Unknown stat names are ignored on application.
pub type StatDelta = BTreeMap<String, i64>;

const VITAL_MIN: i64 = 0;
const VITAL_MAX: i64 = 100;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// The player stat block. The three vitals are clamped to [0,100] on every
/// write; currency saturates instead of clamping; `time` is a wrapping
/// 12-hour-display wall clock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub health: i64,
    pub san: i64,
    pub fatigue: i64,
    pub galleons: i64,
    pub sickle: i64,
    pub knut: i64,
    pub time: ClockTime,
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            health: 100,
            san: 100,
            fatigue: 0,
            galleons: 0,
            sickle: 0,
            knut: 0,
            time: ClockTime::from_hm(8, 0),
        }
    }
}

impl Stats {
    /// Apply a content-supplied delta map. Vitals clamp, currency
    /// saturates, anything else is ignored.
    pub fn apply_delta(&mut self, delta: &StatDelta) {
        for (stat, value) in delta {
            match stat.as_str() {
                "health" => self.health = clamp_vital(self.health + value),
                "san" => self.san = clamp_vital(self.san + value),
                "fatigue" => self.fatigue = clamp_vital(self.fatigue + value),
                "galleons" => self.galleons = self.galleons.saturating_add(*value),
                "sickle" => self.sickle = self.sickle.saturating_add(*value),
                "knut" => self.knut = self.knut.saturating_add(*value),
                _ => {}
            }
        }
    }
}

fn clamp_vital(value: i64) -> i64 {
    value.clamp(VITAL_MIN, VITAL_MAX)
}

/// Minutes past midnight, displayed and parsed as `hh:mm AM|PM`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn from_hm(hour: u16, minute: u16) -> Self {
        ClockTime((hour % 24) * 60 + minute % 60)
    }

    pub fn minutes_past_midnight(self) -> u16 {
        self.0
    }

    /// Advance by a (possibly negative) number of minutes, wrapping around
    /// midnight.
    pub fn advance(&mut self, minutes: i64) {
        let total = (self.0 as i64 + minutes).rem_euclid(MINUTES_PER_DAY);
        self.0 = total as u16;
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hour = self.0 / 60;
        let minute = self.0 % 60;
        let period = if hour >= 12 { "PM" } else { "AM" };
        let display_hour = match hour % 12 {
            0 => 12,
            h => h,
        };
        write!(f, "{display_hour:02}:{minute:02} {period}")
    }
}

impl FromStr for ClockTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || format!("invalid clock time '{s}', expected 'hh:mm AM|PM'");

        let (hm, period) = s.trim().split_once(' ').ok_or_else(err)?;
        let (hour_s, minute_s) = hm.split_once(':').ok_or_else(err)?;
        let hour: u16 = hour_s.parse().map_err(|_| err())?;
        let minute: u16 = minute_s.parse().map_err(|_| err())?;

        if !(1..=12).contains(&hour) || minute > 59 {
            return Err(err());
        }

        let hour24 = match (hour, period) {
            (12, "AM") => 0,
            (h, "AM") => h,
            (12, "PM") => 12,
            (h, "PM") => h + 12,
            _ => return Err(err()),
        };

        Ok(ClockTime(hour24 * 60 + minute))
    }
}

// Serialized as its display string so snapshots carry the same clock text
// the content templates use.
impl Serialize for ClockTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
