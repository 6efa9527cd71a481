pub mod app;
pub mod logging;
pub mod scheduler;

pub use app::{announce_startup, build_cycle, build_notifier, startup_message};
pub use scheduler::CycleScheduler;
