//! Item logging and the batch engine that drives bulk load/update jobs
//! against the repository, with resume-by-log and limit/percent sampling.

pub mod engine;
pub mod error;
pub mod log;

pub use engine::{percent_selected, BatchConfig, BatchEngine, BatchSummary, ItemOutcome, ItemSource};
pub use error::{BatchError, BatchResult};
pub use log::{timestamped_log_name, ItemLog, ItemLogError, ItemLogResult, NullLog};
