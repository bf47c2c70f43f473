//! keysmith CLI
//!
//! Resolves Android release signing from a local `key.properties` file and
//! applies it to Gradle builds.

use anyhow::Result;
use clap::{Parser, Subcommand};
use keysmith_android::gradle::{self, Artifact};
use keysmith_android::keytool;
use keysmith_android::signing::{
    BuildType, DebugIdentity, KeystoreCredentials, SigningConfigResolver, SigningDecision,
};
use keysmith_cli::output::{format_count, format_duration, report_error, Status};
use keysmith_cli::progress;
use keysmith_core::config::Config;
use keysmith_core::error::{exit_codes, Error};
use keysmith_telemetry::{level_for_verbosity, TelemetryConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "keysmith")]
#[command(about = "Resolve and apply Android release signing from key.properties")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which identity signs release builds
    Resolve {
        /// Android project directory (overrides config)
        #[arg(long)]
        project_dir: Option<PathBuf>,
        /// Output as JSON (passwords redacted)
        #[arg(long)]
        json: bool,
    },

    /// Validate the secrets file and the keystore it names
    Check {
        /// Android project directory (overrides config)
        #[arg(long)]
        project_dir: Option<PathBuf>,
        /// Treat a missing secrets file as an error
        #[arg(long)]
        require_release: bool,
        /// Open the keystore with keytool
        #[arg(long)]
        keytool: bool,
    },

    /// Build with the resolved signing identity
    Build {
        /// Android project directory (overrides config)
        #[arg(long)]
        project_dir: Option<PathBuf>,
        /// Build configuration: debug, release
        #[arg(long, default_value = "release")]
        configuration: BuildType,
        /// Build bundle (AAB) instead of APK
        #[arg(long)]
        bundle: bool,
        /// Clean before building
        #[arg(long)]
        clean: bool,
    },

    /// Diagnose signing environment
    Doctor {
        /// Android project directory (overrides config)
        #[arg(long)]
        project_dir: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e);
            std::process::exit(e.exit_code());
        }
    };

    let level = level_for_verbosity(cli.verbose, cli.quiet, &config.schema.logging.level);
    keysmith_telemetry::init_with_config(TelemetryConfig {
        ansi: !cli.no_color,
        ..TelemetryConfig::with_level(level)
    })?;

    let exit_code = match cli.command {
        Commands::Resolve { project_dir, json } => {
            run_resolve(&resolver(&config, project_dir.as_deref()), json)
        }
        Commands::Check {
            project_dir,
            require_release,
            keytool,
        } => run_check(
            &resolver(&config, project_dir.as_deref()),
            require_release,
            keytool,
        ),
        Commands::Build {
            project_dir,
            configuration,
            bundle,
            clean,
        } => run_build(
            &resolver(&config, project_dir.as_deref()),
            configuration,
            bundle,
            clean,
        ),
        Commands::Doctor { project_dir, json } => {
            run_doctor(&resolver(&config, project_dir.as_deref()), json)
        }
    };

    std::process::exit(exit_code);
}

/// Resolver rooted at an absolute project directory, so that resolved store
/// files stay valid when Gradle runs from inside the project
fn resolver(config: &Config, project_dir: Option<&Path>) -> SigningConfigResolver {
    let project_dir = config.project_dir(project_dir);
    let project_dir = if project_dir.is_absolute() {
        project_dir
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&project_dir))
            .unwrap_or(project_dir)
    };
    SigningConfigResolver::from_config(project_dir, &config.schema.signing)
}

fn fail(err: &Error, json: bool) -> i32 {
    if json {
        let body = serde_json::json!({ "error": err.to_report() });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        report_error(err);
    }
    err.exit_code()
}

fn run_resolve(resolver: &SigningConfigResolver, json: bool) -> i32 {
    let decision = match resolver.resolve() {
        Ok(decision) => decision,
        Err(e) => return fail(&e, json),
    };

    if json {
        return match serde_json::to_string_pretty(&decision) {
            Ok(body) => {
                println!("{body}");
                exit_codes::SUCCESS
            }
            Err(e) => fail(&Error::from(e), false),
        };
    }

    match &decision {
        SigningDecision::UseReleaseCredentials(creds) => {
            Status::success(&format!(
                "Release builds are signed with {}",
                resolver.secrets_path().display()
            ));
            print_credentials(creds);
        }
        SigningDecision::UseDebugFallback => {
            Status::warning(&format!(
                "No {}; release builds use debug signing",
                resolver.secrets_path().display()
            ));
            if let Some(identity) = DebugIdentity::locate() {
                Status::detail("debug keystore", &identity.keystore.display().to_string());
                Status::detail("key alias", identity.key_alias);
            }
        }
    }

    exit_codes::SUCCESS
}

fn print_credentials(creds: &KeystoreCredentials) {
    Status::detail("key alias", &creds.key_alias);
    Status::detail(
        "store file",
        &creds
            .store_file
            .as_ref()
            .map_or_else(|| "(not set)".to_string(), |p| p.display().to_string()),
    );
    Status::detail("passwords", "set (hidden)");
}

fn run_check(resolver: &SigningConfigResolver, require_release: bool, with_keytool: bool) -> i32 {
    let creds = match resolver.resolve() {
        Ok(SigningDecision::UseReleaseCredentials(creds)) => creds,
        Ok(SigningDecision::UseDebugFallback) => {
            let message = format!(
                "No {}; release builds use debug signing",
                resolver.secrets_path().display()
            );
            if require_release {
                Status::error(&message);
                return exit_codes::CONFIG_ERROR;
            }
            Status::warning(&message);
            return exit_codes::SUCCESS;
        }
        Err(e) => return fail(&e, false),
    };

    let mut problems = Vec::new();

    if creds.key_alias.is_empty() {
        problems.push("keyAlias is empty".to_string());
    }
    if creds.key_password.is_empty() {
        problems.push("keyPassword is empty".to_string());
    }
    if creds.store_password.is_empty() {
        problems.push("storePassword is empty".to_string());
    }
    match &creds.store_file {
        Some(path) if !path.is_file() => {
            tracing::warn!(path = %path.display(), "Keystore named by storeFile is missing");
            problems.push(format!("storeFile {} does not exist", path.display()));
        }
        Some(_) => {}
        None => problems.push("storeFile is not set".to_string()),
    }

    if with_keytool && problems.is_empty() {
        if keytool::has_keytool() {
            if let Err(e) = keytool::verify(&creds) {
                problems.push(e.message);
            }
        } else {
            Status::warning("keytool not found; keystore not opened");
        }
    }

    if problems.is_empty() {
        Status::success("Release signing configuration is valid");
        print_credentials(&creds);
        exit_codes::SUCCESS
    } else {
        for problem in &problems {
            Status::error(problem);
        }
        Status::error(&format!(
            "Found {}",
            format_count(problems.len(), "problem", "problems")
        ));
        exit_codes::VALIDATION_ERROR
    }
}

fn run_build(
    resolver: &SigningConfigResolver,
    build_type: BuildType,
    bundle: bool,
    clean: bool,
) -> i32 {
    let project_dir = resolver.project_root();

    let decision = match resolver.resolve() {
        Ok(decision) => decision,
        Err(e) => return fail(&e, false),
    };

    if build_type == BuildType::Release && !decision.is_release() {
        Status::warning("No release credentials; signing with the debug keystore");
    }

    if clean {
        Status::info("Cleaning...");
        if let Err(e) = gradle::clean(project_dir) {
            return fail(&e, false);
        }
    }

    let artifact = if bundle { Artifact::Bundle } else { Artifact::Apk };
    let label = format!(
        "Building {} {}",
        build_type,
        if bundle { "bundle" } else { "APK" }
    );
    let spinner = progress::spinner(&label);
    let started = Instant::now();

    match gradle::build(project_dir, build_type, artifact, &decision) {
        Ok(_) => {
            progress::finish_success(&spinner, &label);
            Status::success(&format!(
                "Build succeeded in {}",
                format_duration(started.elapsed())
            ));
            exit_codes::SUCCESS
        }
        Err(e) => {
            progress::finish_error(&spinner, &label);
            fail(&e, false)
        }
    }
}

#[derive(Serialize)]
struct DoctorReport {
    project_dir: PathBuf,
    keytool: bool,
    gradle_wrapper: bool,
    secrets_file: PathBuf,
    signing: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    signing_error: Option<String>,
    debug_keystore: Option<PathBuf>,
    debug_keystore_exists: bool,
}

fn run_doctor(resolver: &SigningConfigResolver, json: bool) -> i32 {
    let decision = resolver.resolve();
    let debug = DebugIdentity::locate();

    let report = DoctorReport {
        project_dir: resolver.project_root().to_path_buf(),
        keytool: keytool::has_keytool(),
        gradle_wrapper: gradle::has_wrapper(resolver.project_root()),
        secrets_file: resolver.secrets_path(),
        signing: match &decision {
            Ok(SigningDecision::UseReleaseCredentials(_)) => "release".to_string(),
            Ok(SigningDecision::UseDebugFallback) => "debug-fallback".to_string(),
            Err(_) => "invalid".to_string(),
        },
        signing_error: decision.as_ref().err().map(|e| e.message.clone()),
        debug_keystore: debug.as_ref().map(|d| d.keystore.clone()),
        debug_keystore_exists: debug.as_ref().is_some_and(DebugIdentity::exists),
    };

    if json {
        return match serde_json::to_string_pretty(&report) {
            Ok(body) => {
                println!("{body}");
                exit_codes::SUCCESS
            }
            Err(e) => fail(&Error::from(e), false),
        };
    }

    Status::header("Signing environment");

    if report.keytool {
        Status::success("keytool: installed");
    } else {
        Status::warning("keytool: not found");
    }

    if report.gradle_wrapper {
        Status::success(&format!("gradle wrapper: {}", report.project_dir.display()));
    } else {
        Status::warning(&format!(
            "gradle wrapper: not found in {}",
            report.project_dir.display()
        ));
    }

    match &decision {
        Ok(SigningDecision::UseReleaseCredentials(creds)) => {
            Status::success(&format!(
                "secrets file: {} (alias {})",
                report.secrets_file.display(),
                creds.key_alias
            ));
        }
        Ok(SigningDecision::UseDebugFallback) => {
            Status::warning(&format!(
                "secrets file: {} not found, release builds use debug signing",
                report.secrets_file.display()
            ));
        }
        Err(e) => report_error(e),
    }

    match &report.debug_keystore {
        Some(path) if report.debug_keystore_exists => {
            Status::success(&format!("debug keystore: {}", path.display()));
        }
        Some(path) => {
            Status::info(&format!(
                "debug keystore: {} (created by the first debug build)",
                path.display()
            ));
        }
        None => Status::warning("debug keystore: no home directory"),
    }

    exit_codes::SUCCESS
}
