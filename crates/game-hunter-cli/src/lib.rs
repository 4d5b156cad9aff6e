//! Game Hunter CLI support: configuration resolution, title input and
//! orchestrator wiring.

pub mod config;
pub mod runner;
pub mod titles;

pub use config::{load_or_default, resolve_config_path};
pub use runner::build_orchestrator;
pub use titles::{parse_sources, read_titles_file, unique_titles};
