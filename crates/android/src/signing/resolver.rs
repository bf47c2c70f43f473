//! Secrets file → signing decision

use super::credentials::KeystoreCredentials;
use crate::properties::Properties;
use keysmith_core::config::SigningConfig;
use keysmith_core::error::{Error, Result, ResultExt};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Which credentials sign a release artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "credentials", rename_all = "snake_case")]
pub enum SigningDecision {
    /// The secrets file exists and holds complete credentials
    UseReleaseCredentials(KeystoreCredentials),
    /// No secrets file; sign with the development identity
    UseDebugFallback,
}

impl SigningDecision {
    /// Whether release credentials were resolved
    #[must_use]
    pub fn is_release(&self) -> bool {
        matches!(self, SigningDecision::UseReleaseCredentials(_))
    }

    /// Release credentials, if any
    #[must_use]
    pub fn credentials(&self) -> Option<&KeystoreCredentials> {
        match self {
            SigningDecision::UseReleaseCredentials(creds) => Some(creds),
            SigningDecision::UseDebugFallback => None,
        }
    }
}

/// Resolve the signing decision for a secrets file
///
/// The project root used for `storeFile` is the directory holding the
/// secrets file. `storeFile` is required.
pub fn resolve(secrets_file: &Path) -> Result<SigningDecision> {
    resolve_at(secrets_file, project_root_of(secrets_file), true)
}

/// Directory holding a secrets file; `.` for a bare file name
fn project_root_of(secrets_file: &Path) -> &Path {
    match secrets_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Resolver bound to an Android project directory
#[derive(Debug, Clone)]
pub struct SigningConfigResolver {
    project_root: PathBuf,
    secrets_file: PathBuf,
    require_store_file: bool,
}

impl SigningConfigResolver {
    /// Resolver for `<project_root>/key.properties`
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self::from_config(project_root, &SigningConfig::default())
    }

    /// Resolver using the `[signing]` configuration section
    pub fn from_config(project_root: impl Into<PathBuf>, config: &SigningConfig) -> Self {
        Self {
            project_root: project_root.into(),
            secrets_file: PathBuf::from(&config.secrets_file),
            require_store_file: config.require_store_file,
        }
    }

    /// Use a different secrets file, relative to the project root
    #[must_use]
    pub fn with_secrets_file(mut self, secrets_file: impl Into<PathBuf>) -> Self {
        self.secrets_file = secrets_file.into();
        self
    }

    /// Whether a missing `storeFile` entry is an error
    #[must_use]
    pub fn require_store_file(mut self, required: bool) -> Self {
        self.require_store_file = required;
        self
    }

    /// Project root against which `storeFile` is resolved
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Full path of the secrets file
    #[must_use]
    pub fn secrets_path(&self) -> PathBuf {
        self.project_root.join(&self.secrets_file)
    }

    /// Resolve the signing decision
    pub fn resolve(&self) -> Result<SigningDecision> {
        resolve_at(
            &self.secrets_path(),
            &self.project_root,
            self.require_store_file,
        )
    }
}

fn resolve_at(
    secrets_file: &Path,
    project_root: &Path,
    require_store_file: bool,
) -> Result<SigningDecision> {
    let exists = secrets_file.try_exists().context(format!(
        "Failed to check for secrets file {}",
        secrets_file.display()
    ))?;

    if !exists {
        tracing::info!(
            path = %secrets_file.display(),
            "No secrets file, release builds use debug signing"
        );
        return Ok(SigningDecision::UseDebugFallback);
    }

    let properties = Properties::load(secrets_file)?;
    let credentials =
        KeystoreCredentials::from_properties(&properties, project_root, require_store_file)
            .map_err(|missing| Error::missing_signing_keys(secrets_file, &missing.0))?;

    tracing::info!(
        path = %secrets_file.display(),
        alias = %credentials.key_alias,
        "Release signing credentials resolved"
    );

    Ok(SigningDecision::UseReleaseCredentials(credentials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use keysmith_core::error::ErrorCode;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    const COMPLETE: &str =
        "keyAlias=prod\nkeyPassword=pw1\nstoreFile=keys/prod.jks\nstorePassword=pw2\n";

    #[test]
    fn test_absent_file_falls_back_to_debug() {
        let dir = TempDir::new().unwrap();
        let decision = resolve(&dir.path().join("key.properties")).unwrap();
        assert_eq!(decision, SigningDecision::UseDebugFallback);
        assert!(!decision.is_release());
        assert!(decision.credentials().is_none());
    }

    #[test]
    fn test_complete_file_resolves_release_credentials() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.properties");
        fs::write(&path, COMPLETE).unwrap();

        let decision = resolve(&path).unwrap();
        let creds = decision.credentials().unwrap();
        assert_eq!(creds.key_alias, "prod");
        assert_eq!(creds.key_password.expose_secret(), "pw1");
        assert_eq!(creds.store_file, Some(dir.path().join("keys/prod.jks")));
        assert_eq!(creds.store_password.expose_secret(), "pw2");
    }

    #[test]
    fn test_partial_file_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.properties");
        fs::write(&path, "keyAlias=prod\n").unwrap();

        let err = resolve(&path).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingSigningKey);
        assert!(err.message.contains("keyPassword"));
        assert!(err.message.contains("storeFile"));
        assert!(err.message.contains("storePassword"));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.properties");
        fs::write(&path, "keyAlias=\\u12G4\n").unwrap();

        let err = resolve(&path).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }

    #[test]
    fn test_directory_in_place_of_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.properties");
        fs::create_dir(&path).unwrap();

        assert!(resolve(&path).is_err());
    }

    #[test]
    fn test_project_root_of_bare_file_name_is_current_dir() {
        assert_eq!(project_root_of(Path::new("key.properties")), Path::new("."));
        assert_eq!(
            project_root_of(Path::new("android/key.properties")),
            Path::new("android")
        );
        assert_eq!(
            project_root_of(Path::new("/work/android/key.properties")),
            Path::new("/work/android")
        );
    }

    #[test]
    fn test_bare_file_name_roots_store_file_at_current_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.properties");
        fs::write(&path, COMPLETE).unwrap();

        let decision = resolve_at(&path, project_root_of(Path::new("key.properties")), true)
            .unwrap();
        assert_eq!(
            decision.credentials().unwrap().store_file,
            Some(PathBuf::from("./keys/prod.jks"))
        );
    }

    #[test]
    fn test_store_file_is_not_resolved_against_cwd() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("android");
        fs::create_dir(&project).unwrap();
        fs::write(project.join("key.properties"), COMPLETE).unwrap();

        let decision = SigningConfigResolver::new(&project).resolve().unwrap();
        assert_eq!(
            decision.credentials().unwrap().store_file,
            Some(project.join("keys/prod.jks"))
        );
    }

    #[test]
    fn test_resolver_custom_secrets_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("release.properties"), COMPLETE).unwrap();

        let resolver = SigningConfigResolver::new(dir.path());
        assert_eq!(resolver.resolve().unwrap(), SigningDecision::UseDebugFallback);

        let resolver = resolver.with_secrets_file("release.properties");
        assert_eq!(resolver.secrets_path(), dir.path().join("release.properties"));
        assert!(resolver.resolve().unwrap().is_release());
    }

    #[test]
    fn test_resolver_from_config_relaxes_store_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("key.properties"),
            "keyAlias=a\nkeyPassword=b\nstorePassword=c\n",
        )
        .unwrap();

        let strict = SigningConfigResolver::new(dir.path());
        assert_eq!(
            strict.resolve().unwrap_err().code,
            ErrorCode::MissingSigningKey
        );

        let config = SigningConfig {
            require_store_file: false,
            ..SigningConfig::default()
        };
        let relaxed = SigningConfigResolver::from_config(dir.path(), &config);
        let decision = relaxed.resolve().unwrap();
        assert!(decision.credentials().unwrap().store_file.is_none());
    }

    #[test]
    fn test_serialized_decision_redacts_passwords() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.properties");
        fs::write(&path, COMPLETE).unwrap();

        let json = serde_json::to_value(resolve(&path).unwrap()).unwrap();
        assert_eq!(json["decision"], "use_release_credentials");
        assert_eq!(json["credentials"]["key_alias"], "prod");
        assert_eq!(json["credentials"]["key_password"], "********");
        assert!(!json.to_string().contains("pw1"));

        let json = serde_json::to_value(SigningDecision::UseDebugFallback).unwrap();
        assert_eq!(json["decision"], "use_debug_fallback");
    }

    proptest! {
        #[test]
        fn prop_absent_file_always_falls_back(name in "[a-zA-Z0-9_]{1,24}\\.properties") {
            let dir = TempDir::new().unwrap();
            let decision = resolve(&dir.path().join(name)).unwrap();
            prop_assert_eq!(decision, SigningDecision::UseDebugFallback);
        }

        #[test]
        fn prop_resolution_is_idempotent(
            alias in "[a-z][a-z0-9_]{0,15}",
            key_password in "[!-~]{1,20}",
            store_password in "[!-~]{1,20}",
        ) {
            // printable ASCII without backslashes, which would be escapes
            prop_assume!(!key_password.contains('\\') && !store_password.contains('\\'));

            let dir = TempDir::new().unwrap();
            let path = dir.path().join("key.properties");
            fs::write(
                &path,
                format!(
                    "keyAlias={alias}\nkeyPassword={key_password}\nstoreFile=upload.jks\nstorePassword={store_password}\n"
                ),
            )
            .unwrap();

            let first = resolve(&path).unwrap();
            let second = resolve(&path).unwrap();
            prop_assert_eq!(&first, &second);

            let creds = first.credentials().unwrap();
            prop_assert_eq!(&creds.key_alias, &alias);
            prop_assert_eq!(creds.key_password.expose_secret(), key_password.as_str());
            prop_assert_eq!(creds.store_password.expose_secret(), store_password.as_str());
        }
    }
}
