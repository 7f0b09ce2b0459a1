//! Daily observation records, as parsed from a station archive and after cleaning.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A GHCN-Daily element code.
///
/// Only the two temperature elements are named; every other code
/// (PRCP, SNOW, ...) is kept verbatim in [`Element::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    /// Daily maximum temperature.
    Tmax,
    /// Daily minimum temperature.
    Tmin,
    Other(String),
}

impl Element {
    pub fn code(&self) -> &str {
        match self {
            Element::Tmax => "TMAX",
            Element::Tmin => "TMIN",
            Element::Other(code) => code,
        }
    }

    pub fn is_temperature(&self) -> bool {
        matches!(self, Element::Tmax | Element::Tmin)
    }
}

impl FromStr for Element {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "TMAX" => Element::Tmax,
            "TMIN" => Element::Tmin,
            other => Element::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One day slot of a raw archive record.
///
/// `value` is in the archive's native unit (tenths of a degree Celsius for
/// temperatures). Missing values never make it into this type: the parser
/// drops the slot instead.
///
/// `day` is the 1-based slot index and is not validated against the month,
/// so day 31 of a 30-day month can appear here. Use [`DailyObservation::date`]
/// when a calendar date is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    pub station_id: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub element: Element,
    pub value: i32,
    pub quality_flag: char,
    pub measurement_flag: char,
    pub source_flag: char,
}

impl DailyObservation {
    /// The calendar date, or `None` if the day slot does not exist in that month.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

/// A temperature observation in degrees Celsius, without flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedObservation {
    pub station_id: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Always [`Element::Tmax`] or [`Element::Tmin`].
    pub element: Element,
    pub value: f64,
}

impl CleanedObservation {
    /// The calendar date, or `None` if the day slot does not exist in that month.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_codes_round_trip() {
        for code in ["TMAX", "TMIN", "PRCP"] {
            let element: Element = code.parse().unwrap();
            assert_eq!(element.code(), code);
        }
        assert!(Element::Tmax.is_temperature());
        assert!(!Element::Other("SNWD".into()).is_temperature());
    }

    #[test]
    fn calendar_invalid_day_has_no_date() {
        let obs = CleanedObservation {
            station_id: "USC00047916".into(),
            year: 2023,
            month: 2,
            day: 30,
            element: Element::Tmin,
            value: 4.5,
        };
        assert_eq!(obs.date(), None);
        let valid = CleanedObservation { day: 28, ..obs };
        assert_eq!(valid.date(), NaiveDate::from_ymd_opt(2023, 2, 28));
    }
}
