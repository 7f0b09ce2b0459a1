//! Parser for the GHCN-Daily `.dly` fixed-width record format.
//!
//! Each line holds one (station, year, month, element) record:
//!
//! | columns   | field      |
//! |-----------|------------|
//! | `0..11`   | station id |
//! | `11..15`  | year       |
//! | `15..17`  | month      |
//! | `17..21`  | element    |
//! | `21..269` | 31 day groups of 8 characters: value (5), quality, measurement and source flag |

use crate::types::observation::{DailyObservation, Element};
use crate::weather_data::error::StationDataError;

/// Minimum length of a complete record line.
pub const RECORD_LEN: usize = 269;
/// Value marking a day without observation.
pub const MISSING_VALUE: i32 = -9999;

const HEADER_LEN: usize = 21;
const DAY_GROUP_LEN: usize = 8;
const DAYS_PER_RECORD: usize = 31;

/// Parses a complete archive into daily observations.
///
/// Lines shorter than [`RECORD_LEN`] are skipped. Day slots whose value is
/// [`MISSING_VALUE`] or not an integer are dropped. Day numbers are the slot
/// positions 1..=31 and are not checked against the length of the month.
///
/// Observations are returned in line order, then day order.
///
/// # Errors
///
/// Returns [`StationDataError::MalformedRecord`] if a complete line has a
/// year or month that is not a number.
///
/// Columns are character positions, so a stray multi-byte character shifts
/// nothing and only affects the field it sits in.
///
/// # Examples
///
/// ```
/// use ghcnd_explorer::parse_archive;
///
/// let mut line = String::from("GME00102380202307TMAX");
/// line.push_str("  215  E");
/// line.push_str(&"-9999   ".repeat(30));
///
/// let observations = parse_archive(&line, "GME00102380").unwrap();
/// assert_eq!(observations.len(), 1);
/// assert_eq!(observations[0].value, 215);
/// assert_eq!(observations[0].source_flag, 'E');
/// ```
pub fn parse_archive(
    raw: &str,
    station_id: &str,
) -> Result<Vec<DailyObservation>, StationDataError> {
    let mut observations = Vec::new();

    for (index, line) in raw.split('\n').enumerate() {
        let columns = Columns::new(line);
        if columns.len() < RECORD_LEN {
            continue;
        }
        let line_no = index + 1;
        let malformed = |field: &'static str, value: &str| StationDataError::MalformedRecord {
            station: station_id.to_string(),
            line: line_no,
            field,
            value: value.to_string(),
        };

        let record_station = columns.get(0, 11).trim();
        let year_field = columns.get(11, 15);
        let year: i32 = year_field
            .trim()
            .parse()
            .map_err(|_| malformed("year", year_field))?;
        let month_field = columns.get(15, 17);
        let month: u32 = month_field
            .trim()
            .parse()
            .map_err(|_| malformed("month", month_field))?;
        let element: Element = columns
            .get(17, HEADER_LEN)
            .parse()
            .unwrap_or_else(|never| match never {});

        for slot in 0..DAYS_PER_RECORD {
            let pos = HEADER_LEN + slot * DAY_GROUP_LEN;
            let Some(value) = parse_day_value(columns.get(pos, pos + 5)) else {
                continue;
            };
            observations.push(DailyObservation {
                station_id: record_station.to_string(),
                year,
                month,
                day: slot as u32 + 1,
                element: element.clone(),
                value,
                quality_flag: columns.char_at(pos + 5),
                measurement_flag: columns.char_at(pos + 6),
                source_flag: columns.char_at(pos + 7),
            });
        }
    }

    Ok(observations)
}

/// A line addressed by character column rather than byte offset.
struct Columns<'a> {
    line: &'a str,
    /// Byte offset of every character plus the line end; `None` for ASCII lines.
    offsets: Option<Vec<usize>>,
}

impl<'a> Columns<'a> {
    fn new(line: &'a str) -> Self {
        let offsets = (!line.is_ascii()).then(|| {
            line.char_indices()
                .map(|(offset, _)| offset)
                .chain(std::iter::once(line.len()))
                .collect()
        });
        Columns { line, offsets }
    }

    fn len(&self) -> usize {
        match &self.offsets {
            Some(offsets) => offsets.len() - 1,
            None => self.line.len(),
        }
    }

    /// Characters `start..end`; both must be at most [`Columns::len`].
    fn get(&self, start: usize, end: usize) -> &'a str {
        match &self.offsets {
            Some(offsets) => &self.line[offsets[start]..offsets[end]],
            None => &self.line[start..end],
        }
    }

    fn char_at(&self, column: usize) -> char {
        self.get(column, column + 1).chars().next().unwrap_or(' ')
    }
}

fn parse_day_value(field: &str) -> Option<i32> {
    field
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|value| *value != MISSING_VALUE)
}
