//! JDK `keytool` wrapper
//!
//! Opens a keystore to confirm that the store password and key alias from a
//! secrets file actually match it. Passwords are handed over through the
//! environment so they never show up in a process listing.

use crate::signing::KeystoreCredentials;
use keysmith_core::error::{Error, ErrorCode, Result};
use keysmith_core::process::{command_exists, run_command_with_env, CommandResult};
use std::path::Path;

const STORE_PASSWORD_ENV: &str = "KEYSMITH_STORE_PASSWORD";

/// Check if keytool is available
#[must_use]
pub fn has_keytool() -> bool {
    command_exists("keytool")
}

/// List a single alias in a keystore
pub fn list_alias(keystore: &Path, alias: &str, store_password: &str) -> Result<CommandResult> {
    let keystore = keystore.to_string_lossy().into_owned();
    run_command_with_env(
        "keytool",
        &[
            "-list",
            "-keystore",
            keystore.as_str(),
            "-alias",
            alias,
            "-storepass:env",
            STORE_PASSWORD_ENV,
        ],
        &[(STORE_PASSWORD_ENV, store_password)],
    )
}

/// Confirm release credentials open their keystore
pub fn verify(creds: &KeystoreCredentials) -> Result<()> {
    let store_file = creds
        .store_file
        .as_deref()
        .ok_or_else(|| Error::config("Release credentials have no storeFile"))?;

    if !store_file.is_file() {
        return Err(Error::file_not_found(store_file).with_context("Keystore named by storeFile"));
    }

    let result = list_alias(store_file, &creds.key_alias, creds.store_password.expose_secret())?;
    if result.success {
        tracing::debug!(alias = %creds.key_alias, "Keystore verified");
        Ok(())
    } else {
        Err(Error::new(
            ErrorCode::KeytoolError,
            format!(
                "keytool could not open alias '{}' in {}",
                creds.key_alias,
                store_file.display()
            ),
        )
        .with_context(result.combined_output().trim().to_string())
        .with_suggestion("Check storePassword and keyAlias in the secrets file"))
    }
}
