pub mod band;
pub mod cycle;
pub mod error;
pub mod policy;

pub use band::{classify, Band, BandSet};
pub use cycle::{parse_metric, CycleOptions, CycleResult, MetricSource, PollCycle};
pub use error::{GasWatchError, Result};
pub use policy::{decide, render_message, Decision, PolicyState};
