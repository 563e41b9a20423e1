//! Utility modules
//!
//! Currently only logging setup.

pub mod logging;

pub use logging::init_logging;
