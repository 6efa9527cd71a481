pub mod bands;
pub mod global;
pub mod loader;

pub use bands::default_bands;
pub use global::{GlobalConfig, LoggingConfig, NotifierConfig, NotifierKind, ServiceConfig};
pub use loader::ConfigLoader;
