//! Address composition, deduplication, and the batch pipeline around them

pub mod compose;
pub mod dedupe;
pub mod emit;
pub mod pipeline;

pub use compose::{compose, format_address};
pub use dedupe::{DEFAULT_DEDUP_LAT_TOLERANCE, dedupe};
pub use emit::write_records;
pub use pipeline::{Enriched, Pipeline, PipelineOutput, RunStats};
