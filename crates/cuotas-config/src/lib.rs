//! cuotas-config
//!
//! Persistent user preferences: display locale, role, debt source and clock
//! settings. Owns the Config data structure plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{app_home, Config, HOME_ENV};
