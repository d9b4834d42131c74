//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod site;
pub mod status;
pub mod workflow;

pub use config::{DeployConfig, validate_config_key, validate_config_value, validate_domain};
pub use error::{ConfigError, ProvisionError, error_code};
pub use site::SiteVariant;
pub use status::{ActiveSite, PortState, SiteStatus};
pub use workflow::{ProvisionOutcome, WorkflowStep};
