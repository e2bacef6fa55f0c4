//! Utility modules: configuration handling and console output.

pub mod config;
pub mod printer;
