//! Command implementations

pub mod config;
pub mod preflight;
pub mod provision;
pub mod render;
pub mod status;
pub mod version;
