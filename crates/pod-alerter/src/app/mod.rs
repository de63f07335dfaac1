//! Application module
//!
//! Wires configuration into the watch loop and drives it from the startup and
//! periodic triggers.

pub mod builder;
pub mod core;
pub mod tasks;

// Re-export main types
pub use self::core::Application;
pub use builder::ApplicationBuilder;
pub use tasks::Scheduler;
