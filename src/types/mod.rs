pub mod aggregates;
pub mod observation;
pub mod station;
pub mod year_span;
