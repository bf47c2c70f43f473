//! Keystore credentials read from a secrets file

use super::secret::SecretString;
use crate::properties::Properties;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key alias entry
pub const KEY_ALIAS: &str = "keyAlias";
/// Key password entry
pub const KEY_PASSWORD: &str = "keyPassword";
/// Keystore path entry
pub const STORE_FILE: &str = "storeFile";
/// Keystore password entry
pub const STORE_PASSWORD: &str = "storePassword";

/// Required entries that were absent from a secrets file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required key(s): {}", .0.join(", "))]
pub struct MissingKeys(pub Vec<&'static str>);

/// Release signing credentials
///
/// Only ever built from a secrets file that exists. `store_file` has already
/// been resolved against the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeystoreCredentials {
    /// Alias of the signing key inside the keystore (`keyAlias`)
    pub key_alias: String,
    /// Password of the signing key (`keyPassword`)
    pub key_password: SecretString,
    /// Keystore path resolved against the project root (`storeFile`)
    pub store_file: Option<PathBuf>,
    /// Password of the keystore (`storePassword`)
    pub store_password: SecretString,
}

impl KeystoreCredentials {
    /// Validate and build credentials from parsed properties
    ///
    /// Every absent required key is reported, not just the first one.
    /// `storeFile` is only required when `require_store_file` is set.
    pub fn from_properties(
        properties: &Properties,
        project_root: &Path,
        require_store_file: bool,
    ) -> Result<Self, MissingKeys> {
        let mut required = vec![KEY_ALIAS, KEY_PASSWORD, STORE_PASSWORD];
        if require_store_file {
            required.insert(2, STORE_FILE);
        }

        let missing: Vec<&'static str> = required
            .into_iter()
            .filter(|key| !properties.contains_key(key))
            .collect();
        if !missing.is_empty() {
            return Err(MissingKeys(missing));
        }

        let value = |key: &str| properties.get(key).unwrap_or_default();

        Ok(Self {
            key_alias: value(KEY_ALIAS).to_string(),
            key_password: SecretString::new(value(KEY_PASSWORD)),
            store_file: properties
                .get(STORE_FILE)
                .map(|raw| resolve_store_file(project_root, raw)),
            store_password: SecretString::new(value(STORE_PASSWORD)),
        })
    }
}

/// Relative paths are taken from the project root, never the working directory
fn resolve_store_file(project_root: &Path, raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(text: &str) -> Properties {
        Properties::parse(text).unwrap()
    }

    #[test]
    fn test_all_keys_present() {
        let creds = KeystoreCredentials::from_properties(
            &props("keyAlias=prod\nkeyPassword=pw1\nstoreFile=keys/prod.jks\nstorePassword=pw2\n"),
            Path::new("/work/android"),
            true,
        )
        .unwrap();

        assert_eq!(creds.key_alias, "prod");
        assert_eq!(creds.key_password.expose_secret(), "pw1");
        assert_eq!(creds.store_file, Some(PathBuf::from("/work/android/keys/prod.jks")));
        assert_eq!(creds.store_password.expose_secret(), "pw2");
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_store_file_kept() {
        let creds = KeystoreCredentials::from_properties(
            &props("keyAlias=a\nkeyPassword=b\nstoreFile=/secure/upload.jks\nstorePassword=c\n"),
            Path::new("/work/android"),
            true,
        )
        .unwrap();

        assert_eq!(creds.store_file, Some(PathBuf::from("/secure/upload.jks")));
    }

    #[test]
    fn test_reports_every_missing_key() {
        let err = KeystoreCredentials::from_properties(
            &props("keyAlias=prod\n"),
            Path::new("."),
            true,
        )
        .unwrap_err();

        assert_eq!(err, MissingKeys(vec![KEY_PASSWORD, STORE_FILE, STORE_PASSWORD]));
        assert_eq!(
            err.to_string(),
            "missing required key(s): keyPassword, storeFile, storePassword"
        );
    }

    #[test]
    fn test_optional_store_file() {
        let creds = KeystoreCredentials::from_properties(
            &props("keyAlias=a\nkeyPassword=b\nstorePassword=c\n"),
            Path::new("."),
            false,
        )
        .unwrap();
        assert!(creds.store_file.is_none());

        let err = KeystoreCredentials::from_properties(
            &props("keyAlias=a\nkeyPassword=b\nstorePassword=c\n"),
            Path::new("."),
            true,
        )
        .unwrap_err();
        assert_eq!(err, MissingKeys(vec![STORE_FILE]));
    }

    #[test]
    fn test_empty_values_count_as_present() {
        let creds = KeystoreCredentials::from_properties(
            &props("keyAlias=\nkeyPassword=\nstoreFile=k.jks\nstorePassword=\n"),
            Path::new("root"),
            true,
        )
        .unwrap();
        assert!(creds.key_alias.is_empty());
        assert!(creds.key_password.is_empty());
    }

    #[test]
    fn test_debug_output_hides_passwords() {
        let creds = KeystoreCredentials::from_properties(
            &props("keyAlias=prod\nkeyPassword=topsecret1\nstoreFile=k.jks\nstorePassword=topsecret2\n"),
            Path::new("."),
            true,
        )
        .unwrap();

        let debug = format!("{creds:?}");
        assert!(debug.contains("prod"));
        assert!(!debug.contains("topsecret1"));
        assert!(!debug.contains("topsecret2"));
    }
}
