//! SoulScript library
//!
//! Exposes the CLI layers for the binary and for integration testing

pub mod cli;
pub mod config;
pub mod metrics;

pub use config::{Config, RunnerConfig};
