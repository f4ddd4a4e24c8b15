//! Configuration: service settings from the environment, the
//! per-project `.teamforge/config.json` file, and project analysis.

pub mod analyzer;
pub mod errors;
pub mod project;
pub mod server;

pub use analyzer::{analyze_project, ProjectAnalysis, ProjectType};
pub use errors::{ConfigError, ConfigResult};
pub use project::{ProjectConfig, ProjectInfo};
pub use server::ServerConfig;
