//! Aggregated temperature summaries derived from cleaned observations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean TMAX/TMIN of one station for one calendar month.
///
/// Either value is `None` when the month had no observations for that element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub station_id: String,
    pub year: i32,
    pub month: u32,
    pub tmax: Option<f64>,
    pub tmin: Option<f64>,
}

/// Mean of the monthly means of one station for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyAggregate {
    pub station_id: String,
    pub year: i32,
    pub tmax: Option<f64>,
    pub tmin: Option<f64>,
}

/// Which side of the equator a station is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    Northern,
    Southern,
}

impl Hemisphere {
    /// Latitude `>= 0` is northern.
    pub fn from_latitude(latitude: f64) -> Self {
        if latitude >= 0.0 {
            Hemisphere::Northern
        } else {
            Hemisphere::Southern
        }
    }

    /// The season a group of calendar months falls in for this hemisphere.
    ///
    /// `quarter` indexes the meteorological quarters starting with
    /// December-February (0) through September-November (3).
    pub(crate) fn season_of_quarter(self, quarter: usize) -> Season {
        const NORTH: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];
        match self {
            Hemisphere::Northern => NORTH[quarter],
            Hemisphere::Southern => NORTH[(quarter + 2) % 4],
        }
    }

    /// The meteorological season of `month` (1-12) in this hemisphere.
    ///
    /// # Examples
    ///
    /// ```
    /// use ghcnd_explorer::{Hemisphere, Season};
    ///
    /// assert_eq!(Hemisphere::Northern.season_of(12), Season::Winter);
    /// assert_eq!(Hemisphere::Southern.season_of(12), Season::Summer);
    /// assert_eq!(Hemisphere::Southern.season_of(4), Season::Fall);
    /// ```
    pub fn season_of(self, month: u32) -> Season {
        let quarter = (month % 12) as usize / 3;
        self.season_of_quarter(quarter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        };
        f.write_str(name)
    }
}

/// Mean of the monthly TMIN (`min`) and TMAX (`max`) values of one season.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeasonStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// One row of the seasonal summary table.
///
/// Winter in the northern hemisphere covers December of the previous year
/// plus January and February of `year`. In the southern hemisphere those same
/// months are summer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalRow {
    pub year: i32,
    pub yearly_min: Option<f64>,
    pub yearly_max: Option<f64>,
    pub winter: SeasonStats,
    pub spring: SeasonStats,
    pub summer: SeasonStats,
    pub fall: SeasonStats,
}

impl SeasonalRow {
    pub fn season(&self, season: Season) -> SeasonStats {
        match season {
            Season::Winter => self.winter,
            Season::Spring => self.spring,
            Season::Summer => self.summer,
            Season::Fall => self.fall,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn northern_months_map_to_meteorological_seasons() {
        let h = Hemisphere::Northern;
        let seasons: Vec<Season> = (1..=12).map(|m| h.season_of(m)).collect();
        use Season::*;
        assert_eq!(
            seasons,
            vec![
                Winter, Winter, Spring, Spring, Spring, Summer, Summer, Summer, Fall, Fall, Fall,
                Winter
            ]
        );
    }

    #[test]
    fn southern_seasons_are_rotated_two_quarters() {
        for month in 1..=12 {
            let north = Hemisphere::Northern.season_of(month);
            let south = Hemisphere::Southern.season_of(month);
            let expected = match north {
                Season::Winter => Season::Summer,
                Season::Spring => Season::Fall,
                Season::Summer => Season::Winter,
                Season::Fall => Season::Spring,
            };
            assert_eq!(south, expected, "month {month}");
        }
    }
}
