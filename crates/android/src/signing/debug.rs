//! The Android SDK's development signing identity

use serde::Serialize;
use std::ffi::OsString;
use std::path::PathBuf;

/// Alias of the key in the SDK-generated debug keystore
pub const DEBUG_KEY_ALIAS: &str = "androiddebugkey";

/// Debug keystore used when release credentials are unavailable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugIdentity {
    /// Path of `debug.keystore`, which may not exist yet
    pub keystore: PathBuf,
    /// Key alias inside the keystore, always [`DEBUG_KEY_ALIAS`]
    pub key_alias: &'static str,
}

impl DebugIdentity {
    /// Locate the debug keystore for the current user
    ///
    /// Honours `ANDROID_USER_HOME`, then the legacy `ANDROID_SDK_HOME`, then
    /// `~/.android`. Returns `None` when no home directory can be found.
    #[must_use]
    pub fn locate() -> Option<Self> {
        android_user_home(|name| std::env::var_os(name), dirs::home_dir()).map(|home| Self {
            keystore: home.join("debug.keystore"),
            key_alias: DEBUG_KEY_ALIAS,
        })
    }

    /// Whether the keystore has been generated yet
    ///
    /// The Android Gradle Plugin creates it on the first debug build.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.keystore.is_file()
    }
}

fn android_user_home(
    env: impl Fn(&str) -> Option<OsString>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    let non_empty = |name: &str| env(name).filter(|value| !value.is_empty());

    if let Some(dir) = non_empty("ANDROID_USER_HOME") {
        return Some(PathBuf::from(dir));
    }
    if let Some(dir) = non_empty("ANDROID_SDK_HOME") {
        return Some(PathBuf::from(dir).join(".android"));
    }
    home.map(|h| h.join(".android"))
}
