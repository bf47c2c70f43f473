//! Core utilities for keysmith signing tools
//!
//! This crate provides shared functionality used by the Android signing tools:
//!
//! - **Error handling**: Coded errors with context and recovery suggestions
//! - **Process execution**: Command execution with captured output
//! - **Configuration**: TOML-based configuration with serde defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use keysmith_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! println!("secrets file: {}", config.schema.signing.secrets_file);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod process;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::process::{command_exists, CommandResult};
}
