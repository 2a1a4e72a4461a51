//! Integration tests for configuration loading
//!
//! Real files on disk, real merge precedence. The global layer is skipped
//! so the tests never depend on the machine's ~/.rsl.

use pretty_assertions::assert_eq;
use rsl_config::{ConfigError, ConfigLoader, ProjectConfig};
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Project directory with a discoverable fake Aqsis install inside it
fn project_with_install() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let install = dir.path().join("aqsis");
    let bin = install.join("bin");
    fs::create_dir_all(&bin).unwrap();
    fs::write(bin.join("aqsisrc"), "").unwrap();
    (dir, install, bin)
}

fn clear_env() {
    std::env::remove_var("RSL_AQSIS_HOME");
    std::env::remove_var("RSL_AQSIS_BIN");
}

#[test]
#[serial]
fn test_full_project_config_round_trip() {
    clear_env();
    let (dir, install, _bin) = project_with_install();
    fs::write(
        dir.path().join("rsl.toml"),
        format!(
            r#"
[toolchain]
home = "{}"

[folders]
compiled_shaders = "build/shaders"
images = "renders"

[images]
format = "tiff"
keep_history = true
timestamp = true
"#,
            install.display()
        ),
    )
    .unwrap();

    let config = ConfigLoader::new()
        .without_global()
        .load_from_directory(dir.path())
        .unwrap();

    assert_eq!(config.toolchain.home, install);
    assert_eq!(
        config.folders.compiled_shaders,
        PathBuf::from("build/shaders")
    );
    assert_eq!(config.folders.images, PathBuf::from("renders"));
    assert_eq!(config.images.format, "tiff");
    assert!(config.images.keep_history);
    assert!(config.images.timestamp);
}

#[test]
#[serial]
fn test_invalid_toml_is_an_error_not_a_fallback() {
    clear_env();
    let (dir, _install, _bin) = project_with_install();
    fs::write(dir.path().join("rsl.toml"), "[toolchain\nhome = ").unwrap();

    let result = ConfigLoader::new()
        .without_global()
        .load_from_directory(dir.path());
    assert!(matches!(result, Err(ConfigError::TomlParseError { .. })));
}

#[test]
fn test_project_config_merge_precedence() {
    let global: ProjectConfig = toml::from_str(
        r#"
[toolchain]
home = "/global/aqsis"

[images]
format = "png"
keep_history = true
"#,
    )
    .unwrap();

    let project: ProjectConfig = toml::from_str(
        r#"
[toolchain]
home = "/project/aqsis"

[images]
format = "jpeg"
"#,
    )
    .unwrap();

    let mut merged = ProjectConfig::default();
    merged.merge(&global);
    merged.merge(&project);

    // Project wins where it speaks, global survives where it does not
    assert_eq!(
        merged.toolchain.as_ref().unwrap().home,
        Some(PathBuf::from("/project/aqsis"))
    );
    let images = merged.images.unwrap();
    assert_eq!(images.format.as_deref(), Some("jpeg"));
    assert_eq!(images.keep_history, Some(true));
}
