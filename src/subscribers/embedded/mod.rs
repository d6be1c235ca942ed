//! # Built-in subscribers
//!
//! - [`LogWriter`]: renders every action as one structured `tracing` line.

mod log;

pub use log::LogWriter;
