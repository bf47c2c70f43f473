//! Resolution of a secrets file named relative to the working directory.
//!
//! Kept in its own test binary: it changes the process working directory.

use keysmith_android::resolve;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn bare_secrets_file_name_resolves_store_file_beside_it() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("key.properties"),
        "keyAlias=prod\nkeyPassword=pw1\nstoreFile=keys/prod.jks\nstorePassword=pw2\n",
    )
    .unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let decision = resolve(Path::new("key.properties")).unwrap();
    let store_file = decision.credentials().unwrap().store_file.clone().unwrap();
    assert_eq!(store_file, PathBuf::from("./keys/prod.jks"));
    assert_eq!(
        fs::canonicalize(dir.path()).unwrap().join("keys/prod.jks"),
        fs::canonicalize(".").unwrap().join(&store_file)
    );

    fs::remove_file("key.properties").unwrap();
    assert!(!resolve(Path::new("key.properties")).unwrap().is_release());
}
