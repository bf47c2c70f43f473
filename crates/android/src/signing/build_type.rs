//! Build types and the signing identity each one uses

use super::credentials::KeystoreCredentials;
use super::resolver::SigningDecision;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Android build type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    /// Development build, always signed with the debug keystore
    Debug,
    /// Distribution build, signed with release credentials when available
    Release,
}

impl BuildType {
    /// Gradle's capitalized variant name
    #[must_use]
    pub fn variant(self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildType::Debug => f.write_str("debug"),
            BuildType::Release => f.write_str("release"),
        }
    }
}

impl FromStr for BuildType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            other => Err(format!("unknown build type '{other}' (expected debug or release)")),
        }
    }
}

/// Identity that signs a given build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningIdentity<'a> {
    /// Release keystore from the secrets file
    Release(&'a KeystoreCredentials),
    /// The SDK's debug keystore
    Debug,
}

/// Signing identity for a build type
///
/// Debug builds always use the debug keystore. Release builds use release
/// credentials when they resolved and fall back to the debug keystore
/// otherwise.
#[must_use]
pub fn signing_for(build_type: BuildType, decision: &SigningDecision) -> SigningIdentity<'_> {
    match (build_type, decision) {
        (BuildType::Release, SigningDecision::UseReleaseCredentials(creds)) => {
            SigningIdentity::Release(creds)
        }
        _ => SigningIdentity::Debug,
    }
}
