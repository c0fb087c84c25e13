//! Configuration for the key registry
//!
//! Holds the password-export parameters, the RSA size floor and the default
//! export format. Loaded from JSON text or a JSON file.

mod settings;

pub use settings::Config;
