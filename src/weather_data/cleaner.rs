use crate::types::observation::{CleanedObservation, DailyObservation};
use crate::utils::round2;

/// Keeps TMAX/TMIN observations, converts tenths of a degree to degrees
/// (rounded to 2 decimals) and drops the flags.
///
/// # Examples
///
/// ```
/// use ghcnd_explorer::{clean_observations, DailyObservation, Element};
///
/// let raw = DailyObservation {
///     station_id: "GME00102380".into(),
///     year: 2023,
///     month: 7,
///     day: 1,
///     element: Element::Tmax,
///     value: 215,
///     quality_flag: ' ',
///     measurement_flag: ' ',
///     source_flag: 'E',
/// };
/// let cleaned = clean_observations(&[raw]);
/// assert_eq!(cleaned[0].value, 21.5);
/// ```
pub fn clean_observations(observations: &[DailyObservation]) -> Vec<CleanedObservation> {
    observations
        .iter()
        .filter(|obs| obs.element.is_temperature())
        .map(|obs| CleanedObservation {
            station_id: obs.station_id.clone(),
            year: obs.year,
            month: obs.month,
            day: obs.day,
            element: obs.element.clone(),
            value: round2(obs.value as f64 / 10.0),
        })
        .collect()
}
