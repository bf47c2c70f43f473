//! Gradle build system integration
//!
//! Runs the project's Gradle wrapper and applies a signing decision to the
//! build through the Android Gradle Plugin's injected signing properties.
//! Store file and alias travel as `-P` arguments; the two passwords travel
//! as `ORG_GRADLE_PROJECT_*` environment variables so they stay out of the
//! process table.

use crate::signing::{signing_for, BuildType, SecretString, SigningDecision, SigningIdentity};
use keysmith_core::error::{Error, Result};
use keysmith_core::process::{run_command_in_dir_with_env, CommandResult};
use std::path::Path;

const INJECTED_STORE_FILE: &str = "android.injected.signing.store.file";
const INJECTED_STORE_PASSWORD: &str = "android.injected.signing.store.password";
const INJECTED_KEY_ALIAS: &str = "android.injected.signing.key.alias";
const INJECTED_KEY_PASSWORD: &str = "android.injected.signing.key.password";

/// Prefix under which Gradle reads project properties from the environment
const PROJECT_PROPERTY_ENV_PREFIX: &str = "ORG_GRADLE_PROJECT_";

/// Packaging format of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Installable APK (`assemble*`)
    Apk,
    /// Play Store bundle (`bundle*`)
    Bundle,
}

/// Gradle task producing an artifact for a build type
#[must_use]
pub fn task_name(build_type: BuildType, artifact: Artifact) -> String {
    let verb = match artifact {
        Artifact::Apk => "assemble",
        Artifact::Bundle => "bundle",
    };
    format!("{}{}", verb, build_type.variant())
}

/// Platform-specific wrapper script name
#[must_use]
pub fn wrapper() -> &'static str {
    if cfg!(windows) {
        "gradlew.bat"
    } else {
        "./gradlew"
    }
}

/// Whether the project ships a Gradle wrapper
#[must_use]
pub fn has_wrapper(project_dir: &Path) -> bool {
    project_dir.join(wrapper()).is_file()
}

/// Gradle properties applying a signing identity
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SigningProperties {
    /// `-P` arguments safe to show in a process listing
    pub args: Vec<String>,
    /// Environment variables carrying the passwords
    pub env: Vec<(String, SecretString)>,
}

impl SigningProperties {
    fn env_pairs(&self) -> Vec<(&str, &str)> {
        self.env
            .iter()
            .map(|(key, value)| (key.as_str(), value.expose_secret()))
            .collect()
    }
}

fn project_property_env(name: &str) -> String {
    format!("{PROJECT_PROPERTY_ENV_PREFIX}{name}")
}

/// Properties applying a signing identity
///
/// The debug identity needs none: the build's own debug signing config
/// applies. Release signing needs all four properties, so credentials
/// without a store file cannot be injected.
pub fn signing_properties(identity: SigningIdentity<'_>) -> Result<SigningProperties> {
    let creds = match identity {
        SigningIdentity::Debug => return Ok(SigningProperties::default()),
        SigningIdentity::Release(creds) => creds,
    };

    let store_file = creds.store_file.as_ref().ok_or_else(|| {
        Error::config("Release credentials have no storeFile")
            .with_suggestion("Add storeFile to the secrets file to sign from the command line")
    })?;

    Ok(SigningProperties {
        args: vec![
            format!("-P{}={}", INJECTED_STORE_FILE, store_file.display()),
            format!("-P{}={}", INJECTED_KEY_ALIAS, creds.key_alias),
        ],
        env: vec![
            (
                project_property_env(INJECTED_STORE_PASSWORD),
                creds.store_password.clone(),
            ),
            (
                project_property_env(INJECTED_KEY_PASSWORD),
                creds.key_password.clone(),
            ),
        ],
    })
}

/// Run a Gradle task with extra arguments and environment
///
/// A non-zero exit becomes a [`ErrorCode::GradleError`] carrying Gradle's
/// output as context.
///
/// [`ErrorCode::GradleError`]: keysmith_core::error::ErrorCode::GradleError
pub fn run_task(
    project_dir: &Path,
    task: &str,
    extra_args: &[String],
    env: &[(&str, &str)],
) -> Result<CommandResult> {
    if !has_wrapper(project_dir) {
        return Err(Error::command_not_found("gradlew")
            .with_context(format!("No Gradle wrapper in {}", project_dir.display())));
    }

    let mut args: Vec<&str> = vec![task];
    args.extend(extra_args.iter().map(String::as_str));

    tracing::info!(task, project = %project_dir.display(), "Running Gradle task");
    let result = run_command_in_dir_with_env(wrapper(), &args, project_dir, env)?;
    if !result.success {
        tracing::debug!(task, exit_code = result.exit_code, "Gradle task failed");
        return Err(Error::gradle(format!(
            "Gradle task '{}' failed with exit code {}",
            task, result.exit_code
        ))
        .with_context(result.combined_output().trim().to_string()));
    }
    Ok(result)
}

/// Build an artifact signed according to a signing decision
pub fn build(
    project_dir: &Path,
    build_type: BuildType,
    artifact: Artifact,
    decision: &SigningDecision,
) -> Result<CommandResult> {
    let identity = signing_for(build_type, decision);
    if build_type == BuildType::Release && identity == SigningIdentity::Debug {
        tracing::warn!("Release build signed with the debug keystore");
    }

    let signing = signing_properties(identity)?;
    run_task(
        project_dir,
        &task_name(build_type, artifact),
        &signing.args,
        &signing.env_pairs(),
    )
}

/// Clean build artifacts
pub fn clean(project_dir: &Path) -> Result<CommandResult> {
    run_task(project_dir, "clean", &[], &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::{KeystoreCredentials, SecretString};
    use keysmith_core::error::ErrorCode;
    use std::path::PathBuf;

    fn credentials(store_file: Option<&str>) -> KeystoreCredentials {
        KeystoreCredentials {
            key_alias: "prod".to_string(),
            key_password: SecretString::new("pw1"),
            store_file: store_file.map(PathBuf::from),
            store_password: SecretString::new("pw2"),
        }
    }

    #[test]
    fn test_task_names() {
        assert_eq!(task_name(BuildType::Debug, Artifact::Apk), "assembleDebug");
        assert_eq!(task_name(BuildType::Release, Artifact::Apk), "assembleRelease");
        assert_eq!(task_name(BuildType::Release, Artifact::Bundle), "bundleRelease");
    }

    #[test]
    fn test_debug_identity_injects_nothing() {
        let props = signing_properties(SigningIdentity::Debug).unwrap();
        assert!(props.args.is_empty());
        assert!(props.env.is_empty());
    }

    #[test]
    fn test_release_identity_injects_all_properties() {
        let creds = credentials(Some("/work/android/keys/prod.jks"));
        let props = signing_properties(SigningIdentity::Release(&creds)).unwrap();

        assert_eq!(
            props.args,
            vec![
                "-Pandroid.injected.signing.store.file=/work/android/keys/prod.jks",
                "-Pandroid.injected.signing.key.alias=prod",
            ]
        );
        assert!(props.args.iter().all(|a| !a.contains("pw1") && !a.contains("pw2")));

        assert_eq!(
            props.env_pairs(),
            vec![
                ("ORG_GRADLE_PROJECT_android.injected.signing.store.password", "pw2"),
                ("ORG_GRADLE_PROJECT_android.injected.signing.key.password", "pw1"),
            ]
        );
    }

    #[test]
    fn test_signing_properties_debug_output_redacts_passwords() {
        let creds = credentials(Some("/keys/prod.jks"));
        let props = signing_properties(SigningIdentity::Release(&creds)).unwrap();
        let debug = format!("{props:?}");
        assert!(!debug.contains("pw1"));
        assert!(!debug.contains("pw2"));
    }

    #[test]
    fn test_release_without_store_file_cannot_be_injected() {
        let creds = credentials(None);
        let err = signing_properties(SigningIdentity::Release(&creds)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }

    #[test]
    fn test_missing_wrapper() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(!has_wrapper(dir.path()));

        let err = clean(dir.path()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CommandNotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_release_build_passes_signing_to_wrapper() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("gradlew");
        std::fs::write(
            &script,
            "#!/bin/sh\nprintf '%s\\n' \"$@\"\nprintf 'env:%s\\n' \"$(printenv ORG_GRADLE_PROJECT_android.injected.signing.store.password)\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let decision =
            SigningDecision::UseReleaseCredentials(credentials(Some("/keys/prod.jks")));
        let result = build(dir.path(), BuildType::Release, Artifact::Bundle, &decision).unwrap();

        assert!(result.success);
        let lines: Vec<&str> = result.stdout.lines().collect();
        assert_eq!(lines[0], "bundleRelease");
        assert!(lines.contains(&"-Pandroid.injected.signing.key.alias=prod"));
        assert!(lines.contains(&"env:pw2"));

        let fallback = build(
            dir.path(),
            BuildType::Release,
            Artifact::Apk,
            &SigningDecision::UseDebugFallback,
        )
        .unwrap();
        assert_eq!(fallback.stdout.lines().next(), Some("assembleRelease"));
        assert!(fallback.stdout.contains("env:\n"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_task_is_gradle_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("gradlew");
        std::fs::write(&script, "#!/bin/sh\necho 'FAILURE: Build failed' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = clean(dir.path()).unwrap_err();
        assert_eq!(err.code, ErrorCode::GradleError);
        assert_eq!(err.exit_code(), 1);
        assert!(err.context.unwrap().contains("FAILURE: Build failed"));
    }
}
