//! Release signing resolution
//!
//! Decides which identity signs a release artifact. A local, git-ignored
//! `key.properties` file supplies release credentials; when it is absent,
//! release builds fall back to the SDK's debug keystore so that fresh
//! checkouts and CI jobs without secrets still build.

mod build_type;
mod credentials;
mod debug;
mod resolver;
mod secret;

pub use build_type::{signing_for, BuildType, SigningIdentity};
pub use credentials::{
    KeystoreCredentials, MissingKeys, KEY_ALIAS, KEY_PASSWORD, STORE_FILE, STORE_PASSWORD,
};
pub use debug::{DebugIdentity, DEBUG_KEY_ALIAS};
pub use resolver::{resolve, SigningConfigResolver, SigningDecision};
pub use secret::SecretString;
