//! Main application modules.

pub mod logging;

// Re-export public API
pub use logging::log_progress;
