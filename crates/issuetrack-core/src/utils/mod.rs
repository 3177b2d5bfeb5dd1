//! Utility functions for display formatting.

pub mod format;

pub use format::{age_display, age_since, truncate_string};
