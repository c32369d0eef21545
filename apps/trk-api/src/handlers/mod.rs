//! Handlers 模块

pub mod log;
pub mod metrics;

pub use log::*;
pub use metrics::*;
