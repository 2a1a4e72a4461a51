//! CLI integration tests
//!
//! Drive the `rsl` binary end to end against a fake Aqsis toolchain.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn rsl() -> Command {
    Command::cargo_bin("rsl").unwrap()
}

#[test]
fn test_help_lists_subcommands() {
    rsl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("lsp"));
}

#[test]
fn test_build_without_scene_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("matte.sl"), "surface matte() {}\n").unwrap();

    rsl()
        .arg("build")
        .arg("-C")
        .arg(dir.path())
        .env("RSL_AQSIS_HOME", dir.path())
        .env("RSL_AQSIS_BIN", dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No scene file"));
}

#[cfg(unix)]
mod with_fake_toolchain {
    use super::*;

    struct Fixture {
        _dir: TempDir,
        root: PathBuf,
        bin: PathBuf,
    }

    fn write_script(path: &Path, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        fs::write(path, body).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let bin = root.join("bin");
        fs::create_dir_all(&bin).unwrap();

        write_script(
            &bin.join("aqsl"),
            r#"#!/bin/sh
out=""
src=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; shift 2; else src="$1"; shift 1; fi
done
case "$src" in
  *bad*)
    echo "2 : syntax error" >&2
    exit 2
    ;;
esac
: > "$out"
exit 0
"#,
        );

        write_script(
            &bin.join("aqsis"),
            r#"#!/bin/sh
printf 'not-an-image' > out.tif
exit 0
"#,
        );

        fs::write(
            root.join("scene.rib"),
            "Display \"out.tif\" \"file\" \"rgba\"\nSurface \"matte\"\n",
        )
        .unwrap();

        Fixture { _dir: dir, root, bin }
    }

    fn build_cmd(fx: &Fixture) -> Command {
        let mut cmd = rsl();
        cmd.arg("build")
            .arg("-C")
            .arg(&fx.root)
            .env_remove("RSL_JSON")
            .env("RSL_AQSIS_HOME", &fx.root)
            .env("RSL_AQSIS_BIN", &fx.bin);
        cmd
    }

    #[test]
    fn test_build_success_reports_image() {
        let fx = fixture();
        fs::write(fx.root.join("matte.sl"), "surface matte() {}\n").unwrap();

        build_cmd(&fx)
            .arg(fx.root.join("scene.rib"))
            .assert()
            .success()
            .stdout(predicate::str::contains("Build succeeded"));

        assert!(fx.root.join("compiled").join("matte.slx").exists());
    }

    #[test]
    fn test_build_defaults_to_single_scene() {
        let fx = fixture();

        build_cmd(&fx).assert().success();
    }

    #[test]
    fn test_failed_shader_prints_diagnostics() {
        let fx = fixture();
        fs::write(fx.root.join("bad.sl"), "surface bad() {\n   oops(\n}\n").unwrap();

        build_cmd(&fx)
            .arg(fx.root.join("scene.rib"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("bad.sl:2:4: error: 2 : syntax error"))
            .stderr(predicate::str::contains("1 shader(s) failed to compile"));
    }

    #[test]
    fn test_json_output_on_success() {
        let fx = fixture();

        build_cmd(&fx)
            .arg("--json")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"success\":true"));
    }

    #[test]
    fn test_clean_removes_artifacts() {
        let fx = fixture();
        fs::write(fx.root.join("matte.sl"), "surface matte() {}\n").unwrap();
        build_cmd(&fx).assert().success();
        assert!(fx.root.join("compiled").exists());

        rsl()
            .arg("clean")
            .arg("-C")
            .arg(&fx.root)
            .env("RSL_AQSIS_HOME", &fx.root)
            .env("RSL_AQSIS_BIN", &fx.bin)
            .assert()
            .success();
        assert!(!fx.root.join("compiled").exists());
    }
}
