//! Android release-signing tools
//!
//! This crate provides:
//! - Java `.properties` parsing for `key.properties` secrets files
//! - Release signing resolution with debug-keystore fallback
//! - Gradle build integration with injected signing properties
//! - `keytool` keystore verification

#![warn(missing_docs)]

pub mod gradle;
pub mod keytool;
pub mod properties;
pub mod signing;

pub use properties::Properties;
pub use signing::{resolve, KeystoreCredentials, SigningConfigResolver, SigningDecision};
