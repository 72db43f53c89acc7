/// Database configuration and connection management
pub mod database;

/// Service settings loaded from `trend_monitor.toml`
pub mod settings;

pub use settings::{GeneratorKind, GeneratorSettings, Settings};
