//! Inclusive year ranges used to filter stations and seasonal summaries.

use std::fmt;

/// Earliest year accepted by [`YearSpan`].
pub const MIN_YEAR: i32 = 0;
/// Latest year accepted by [`YearSpan`].
pub const MAX_YEAR: i32 = 2024;

/// An inclusive `[from, to]` range of years.
///
/// Both ends are clamped to `MIN_YEAR..=MAX_YEAR` and the span is never
/// inverted. When an edit would invert it, the other end is dragged along,
/// so changing `from` past `to` moves `to` as well, and vice versa.
///
/// # Examples
///
/// ```
/// use ghcnd_explorer::YearSpan;
///
/// let span = YearSpan::new(2000, 2024).with_from(2030);
/// assert_eq!((span.from(), span.to()), (2024, 2024));
///
/// let span = YearSpan::new(1990, 2000).with_to(1980);
/// assert_eq!((span.from(), span.to()), (1980, 1980));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearSpan {
    from: i32,
    to: i32,
}

impl YearSpan {
    /// Creates a span, clamping both ends. If `from > to`, `to` is raised to `from`.
    pub fn new(from: i32, to: i32) -> Self {
        YearSpan::all().with_to(to).with_from(from)
    }

    /// The widest possible span.
    pub fn all() -> Self {
        Self {
            from: MIN_YEAR,
            to: MAX_YEAR,
        }
    }

    pub fn from(&self) -> i32 {
        self.from
    }

    pub fn to(&self) -> i32 {
        self.to
    }

    /// Returns `true` if `year` lies inside the span.
    pub fn contains(&self, year: i32) -> bool {
        (self.from..=self.to).contains(&year)
    }

    /// Moves the start of the span, dragging the end along if needed.
    pub fn with_from(self, from: i32) -> Self {
        let from = from.clamp(MIN_YEAR, MAX_YEAR);
        Self {
            from,
            to: self.to.max(from),
        }
    }

    /// Moves the end of the span, dragging the start along if needed.
    pub fn with_to(self, to: i32) -> Self {
        let to = to.clamp(MIN_YEAR, MAX_YEAR);
        Self {
            from: self.from.min(to),
            to,
        }
    }
}

impl Default for YearSpan {
    /// 2000 through [`MAX_YEAR`].
    fn default() -> Self {
        YearSpan::new(2000, MAX_YEAR)
    }
}

impl fmt::Display for YearSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}
