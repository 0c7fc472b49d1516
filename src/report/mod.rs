//! Report module - filtering, aggregation and display formatting

mod format;
mod projector;

pub use projector::{
    DetailRow, GroupCount, ReportProjector, Summary, ViewResult, YearChart, ALLOWED_GROUP_CODES,
};
