pub mod agent;
pub mod configuration;
pub mod controller;
pub mod errors;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod session;
pub mod toolkits;

pub use configuration::{build_controller, ConfigError, Settings};
pub use controller::{Turn, TurnController};
