//! CLI utilities for flavorkit tools
//!
//! Provides shared CLI functionality:
//! - Terminal output formatting
//! - Progress spinners

#![warn(missing_docs)]

pub mod output;
pub mod progress;
