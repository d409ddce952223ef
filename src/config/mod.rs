//! Configuration loading and management for the ERP calculation engine.
//!
//! This module loads the campus configuration from YAML files (institution
//! metadata, attendance policies, payment methods and fee structures) and
//! reads the server binary's settings from the environment.
//!
//! # Example
//!
//! ```no_run
//! use erp_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/campus").unwrap();
//! println!("Loaded institution: {}", config.institution().name);
//! ```

mod loader;
mod settings;
mod types;

pub use loader::ConfigLoader;
pub use settings::{DEFAULT_CONFIG_DIR, DEFAULT_HOST, DEFAULT_PORT, ServerSettings};
pub use types::{
    CampusConfig, FeeStructuresConfig, InstitutionMetadata, PaymentMethodConfig,
    PaymentMethodsConfig, PoliciesConfig,
};
