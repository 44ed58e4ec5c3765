//! # evnet-scenarios: Problem Instances and Synthetic Networks
//!
//! - [`instance`]: JSON/YAML problem files, conversion to a planner, and a
//!   diagnostics pass over an instance
//! - [`region`]: polygonal planning regions (random and grid placement)
//! - [`generator`]: random instances with spatially correlated economics

pub mod generator;
pub mod instance;
pub mod region;

pub use generator::{load_generator_config, GeneratorConfig, NetworkGenerator};
pub use instance::{
    load_instance, save_instance, validate_instance, ProblemInstance, ReferenceRecord, SiteRecord,
};
pub use region::{Bounds, Region};
