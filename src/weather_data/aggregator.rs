//! Monthly, yearly and seasonal temperature summaries.
//!
//! All functions are pure: they take an input slice and return a new,
//! year-ordered `Vec`. Means only consider present values and are rounded to
//! two decimals.

use crate::types::aggregates::{
    Hemisphere, MonthlyAggregate, Season, SeasonStats, SeasonalRow, YearlyAggregate,
};
use crate::types::observation::{CleanedObservation, Element};
use crate::types::year_span::YearSpan;
use crate::utils::{mean_of_present, round2};
use std::collections::{BTreeMap, HashMap};

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| round2(self.sum / self.count as f64))
    }
}

/// Mean TMAX and TMIN per (year, month), sorted by year then month.
pub fn monthly_averages(cleaned: &[CleanedObservation]) -> Vec<MonthlyAggregate> {
    let mut groups: BTreeMap<(i32, u32), (&str, Accumulator, Accumulator)> = BTreeMap::new();

    for obs in cleaned {
        let (_, tmax, tmin) = groups
            .entry((obs.year, obs.month))
            .or_insert_with(|| {
                (
                    obs.station_id.as_str(),
                    Accumulator::default(),
                    Accumulator::default(),
                )
            });
        match obs.element {
            Element::Tmax => tmax.push(obs.value),
            Element::Tmin => tmin.push(obs.value),
            Element::Other(_) => {}
        }
    }

    groups
        .into_iter()
        .map(|((year, month), (station_id, tmax, tmin))| MonthlyAggregate {
            station_id: station_id.to_string(),
            year,
            month,
            tmax: tmax.mean(),
            tmin: tmin.mean(),
        })
        .collect()
}

/// Mean of the monthly means per year, sorted by year.
///
/// Years with only some months present still get a row, averaged over the
/// months that exist.
pub fn yearly_averages(monthly: &[MonthlyAggregate]) -> Vec<YearlyAggregate> {
    let mut groups: BTreeMap<i32, Vec<&MonthlyAggregate>> = BTreeMap::new();
    for row in monthly {
        groups.entry(row.year).or_default().push(row);
    }

    groups
        .into_iter()
        .map(|(year, rows)| YearlyAggregate {
            station_id: rows[0].station_id.clone(),
            year,
            tmax: mean_of_present(rows.iter().map(|r| r.tmax)).map(round2),
            tmin: mean_of_present(rows.iter().map(|r| r.tmin)).map(round2),
        })
        .collect()
}

/// Calendar months of each meteorological quarter, as `(year offset, month)`.
const QUARTERS: [[(i32, u32); 3]; 4] = [
    [(-1, 12), (0, 1), (0, 2)],
    [(0, 3), (0, 4), (0, 5)],
    [(0, 6), (0, 7), (0, 8)],
    [(0, 9), (0, 10), (0, 11)],
];

/// Seasonal min/max summary for every year present in `monthly`.
///
/// The December-February quarter of year `Y` uses December of `Y - 1`. That
/// quarter is winter in the northern hemisphere and summer in the southern.
/// Yearly values are the [`yearly_averages`] of the same input.
pub fn seasonal_summary(
    monthly: &[MonthlyAggregate],
    hemisphere: Hemisphere,
) -> Vec<SeasonalRow> {
    let by_month: HashMap<(i32, u32), &MonthlyAggregate> =
        monthly.iter().map(|m| ((m.year, m.month), m)).collect();

    yearly_averages(monthly)
        .into_iter()
        .map(|yearly| {
            let mut row = SeasonalRow {
                year: yearly.year,
                yearly_min: yearly.tmin,
                yearly_max: yearly.tmax,
                winter: SeasonStats::default(),
                spring: SeasonStats::default(),
                summer: SeasonStats::default(),
                fall: SeasonStats::default(),
            };
            for (quarter, months) in QUARTERS.iter().enumerate() {
                let present: Vec<&MonthlyAggregate> = months
                    .iter()
                    .filter_map(|(offset, month)| by_month.get(&(yearly.year + offset, *month)))
                    .copied()
                    .collect();
                let stats = SeasonStats {
                    min: mean_of_present(present.iter().map(|m| m.tmin)).map(round2),
                    max: mean_of_present(present.iter().map(|m| m.tmax)).map(round2),
                };
                match hemisphere.season_of_quarter(quarter) {
                    Season::Winter => row.winter = stats,
                    Season::Spring => row.spring = stats,
                    Season::Summer => row.summer = stats,
                    Season::Fall => row.fall = stats,
                }
            }
            row
        })
        .collect()
}

/// Seasonal summary restricted to `years`.
///
/// Monthly data outside the span is discarded *before* the seasons are
/// computed, so the first year's winter does not see the preceding December.
pub fn seasonal_summary_within(
    monthly: &[MonthlyAggregate],
    hemisphere: Hemisphere,
    years: YearSpan,
) -> Vec<SeasonalRow> {
    let in_span: Vec<MonthlyAggregate> = monthly
        .iter()
        .filter(|m| years.contains(m.year))
        .cloned()
        .collect();
    seasonal_summary(&in_span, hemisphere)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATION: &str = "GME00102380";

    fn obs(year: i32, month: u32, day: u32, element: Element, value: f64) -> CleanedObservation {
        CleanedObservation {
            station_id: STATION.into(),
            year,
            month,
            day,
            element,
            value,
        }
    }

    fn month(year: i32, month: u32, tmax: Option<f64>, tmin: Option<f64>) -> MonthlyAggregate {
        MonthlyAggregate {
            station_id: STATION.into(),
            year,
            month,
            tmax,
            tmin,
        }
    }

    #[test]
    fn monthly_means_are_pivoted_per_month() {
        let cleaned = vec![
            obs(2020, 2, 1, Element::Tmax, 10.0),
            obs(2020, 1, 1, Element::Tmax, 1.0),
            obs(2020, 1, 2, Element::Tmax, 2.0),
            obs(2020, 1, 3, Element::Tmax, 2.0),
            obs(2020, 1, 1, Element::Tmin, -4.0),
        ];
        let monthly = monthly_averages(&cleaned);
        assert_eq!(
            monthly,
            vec![
                month(2020, 1, Some(1.67), Some(-4.0)),
                month(2020, 2, Some(10.0), None),
            ]
        );
    }

    #[test]
    fn monthly_ties_round_to_even() {
        let cleaned = vec![
            obs(2020, 3, 1, Element::Tmax, 1.0),
            obs(2020, 3, 2, Element::Tmax, 1.0),
            obs(2020, 3, 3, Element::Tmax, 1.0),
            obs(2020, 3, 4, Element::Tmax, 1.5),
            obs(2020, 3, 1, Element::Tmin, 0.25),
            obs(2020, 3, 2, Element::Tmin, 0.5),
        ];
        let monthly = monthly_averages(&cleaned);
        assert_eq!(monthly[0].tmax, Some(1.12));
        assert_eq!(monthly[0].tmin, Some(0.38));
    }

    #[test]
    fn monthly_keys_are_unique_and_sorted() {
        let cleaned: Vec<_> = (0..60)
            .map(|i| obs(2000 + (i % 3), 1 + (i % 12) as u32, 1, Element::Tmin, i as f64))
            .collect();
        let monthly = monthly_averages(&cleaned);
        let keys: Vec<_> = monthly.iter().map(|m| (m.year, m.month)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn yearly_is_mean_of_monthly_means() {
        // January has 3 days, February 1: a daily mean would give 3.25.
        let cleaned = vec![
            obs(2020, 1, 1, Element::Tmax, 1.0),
            obs(2020, 1, 2, Element::Tmax, 1.0),
            obs(2020, 1, 3, Element::Tmax, 1.0),
            obs(2020, 2, 1, Element::Tmax, 10.0),
        ];
        let yearly = yearly_averages(&monthly_averages(&cleaned));
        assert_eq!(yearly.len(), 1);
        assert_eq!(yearly[0].tmax, Some(5.5));
        assert_eq!(yearly[0].tmin, None);
    }

    #[test]
    fn yearly_years_match_monthly_years() {
        let monthly = vec![
            month(1999, 12, Some(3.0), Some(-1.0)),
            month(2001, 6, None, Some(11.0)),
            month(2001, 7, Some(25.0), Some(13.0)),
        ];
        let yearly = yearly_averages(&monthly);
        let years: Vec<i32> = yearly.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![1999, 2001]);
        assert_eq!(yearly[1].tmax, Some(25.0));
        assert_eq!(yearly[1].tmin, Some(12.0));
    }

    fn full_years(years: std::ops::RangeInclusive<i32>) -> Vec<MonthlyAggregate> {
        years
            .flat_map(|y| {
                (1..=12).map(move |m| {
                    let tmax = if m == 12 { 10.0 + (y - 2000) as f64 } else { 4.0 + m as f64 };
                    month(y, m, Some(tmax), Some(tmax - 10.0))
                })
            })
            .collect()
    }

    #[test]
    fn northern_winter_uses_previous_december() {
        let monthly = full_years(2000..=2001);
        let rows = seasonal_summary(&monthly, Hemisphere::Northern);
        assert_eq!(rows.len(), 2);

        // 2000 has no December 1999: Jan 5.0, Feb 6.0.
        assert_eq!(rows[0].winter.max, Some(5.5));
        // 2001 winter: Dec 2000 (10.0), Jan 5.0, Feb 6.0.
        assert_eq!(rows[1].winter.max, Some(7.0));
        assert_eq!(rows[1].winter.min, Some(-3.0));
        assert_eq!(rows[1].spring.max, Some(8.0));
        assert_eq!(rows[1].summer.max, Some(11.0));
        assert_eq!(rows[1].fall.max, Some(14.0));
    }

    #[test]
    fn southern_seasons_swap_labels() {
        let monthly = full_years(2000..=2001);
        let north = seasonal_summary(&monthly, Hemisphere::Northern);
        let south = seasonal_summary(&monthly, Hemisphere::Southern);
        for (n, s) in north.iter().zip(&south) {
            assert_eq!(n.winter, s.summer);
            assert_eq!(n.spring, s.fall);
            assert_eq!(n.summer, s.winter);
            assert_eq!(n.fall, s.spring);
            assert_eq!(n.yearly_max, s.yearly_max);
        }
    }

    #[test]
    fn empty_season_is_none() {
        let monthly = vec![month(2010, 7, Some(30.0), Some(18.0))];
        let rows = seasonal_summary(&monthly, Hemisphere::Northern);
        assert_eq!(rows[0].summer, SeasonStats { min: Some(18.0), max: Some(30.0) });
        assert_eq!(rows[0].winter, SeasonStats::default());
        assert_eq!(rows[0].yearly_max, Some(30.0));
    }

    #[test]
    fn span_filter_applies_before_seasons() {
        let monthly = full_years(2000..=2002);
        let rows =
            seasonal_summary_within(&monthly, Hemisphere::Northern, YearSpan::new(2001, 2001));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, 2001);
        assert_eq!(rows[0].winter.max, Some(5.5));
    }
}
