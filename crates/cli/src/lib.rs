//! Terminal output utilities for keysmith tools
//!
//! Provides shared CLI functionality:
//! - Status messages
//! - Progress spinners for long-running builds

#![warn(missing_docs)]

pub mod output;
pub mod progress;
