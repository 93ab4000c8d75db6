//! Dispatch CLI - batch assignment of the drone fleet.
//!
//! This crate provides the `dispatch` binary plus the pieces it is built
//! from:
//! - config: environment-driven defaults
//! - report: rendering of the run result

pub mod config;
pub mod report;

pub use config::Config;
pub use report::{render_report, RunReport};
