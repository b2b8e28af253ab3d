//! End-to-end tests for the `impfmt` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn impfmt(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_impfmt"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run impfmt")
}

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

fn read(dir: &TempDir, name: &str) -> String {
    fs::read_to_string(dir.path().join(name)).unwrap()
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ============================================================================
// fix
// ============================================================================

mod fix {
    use super::*;

    #[test]
    fn rewrites_in_place() {
        let dir = workspace(&[("app.py", "import sys\nimport os\n\nprint(os, sys)\n")]);
        let output = impfmt(dir.path(), &["fix", "app.py"]);
        assert!(output.status.success());
        assert_eq!(read(&dir, "app.py"), "import os\nimport sys\n\nprint(os, sys)\n");
        assert!(stdout(&output).contains("fixed app.py"));
    }

    #[test]
    fn check_reports_without_writing() {
        let dir = workspace(&[("app.py", "import sys\nimport os\n")]);
        let output = impfmt(dir.path(), &["fix", "--check", "app.py"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stdout(&output).contains("would fix app.py"));
        assert_eq!(read(&dir, "app.py"), "import sys\nimport os\n");

        impfmt(dir.path(), &["fix", "app.py"]);
        let output = impfmt(dir.path(), &["fix", "--check", "app.py"]);
        assert!(output.status.success());
    }

    #[test]
    fn json_report() {
        let dir = workspace(&[
            ("a.py", "import b\nimport a\n"),
            ("b.py", "import a\n"),
        ]);
        let output = impfmt(dir.path(), &["--format", "json", "fix", "a.py", "b.py"]);
        assert!(output.status.success());
        let report = json(&output);
        assert_eq!(report["status"], "ok");
        assert_eq!(report["schema_version"], "1");
        assert_eq!(report["files"][0]["status"], "changed");
        assert_eq!(report["files"][1]["status"], "unchanged");
        assert_eq!(report["summary"]["files_checked"], 2);
        assert_eq!(report["summary"]["files_changed"], 1);
    }

    #[test]
    fn rename_and_width_flags() {
        let dir = workspace(&[("app.py", "from legacy.api import Client, Server, Session\n")]);
        let output = impfmt(
            dir.path(),
            &["fix", "--rename", "legacy.api=core.api", "--width", "30", "app.py"],
        );
        assert!(output.status.success());
        assert_eq!(
            read(&dir, "app.py"),
            "from core.api import (Client,\n    Server, Session)\n"
        );
    }

    #[test]
    fn invert_applies_renames_backwards() {
        let dir = workspace(&[("app.py", "from core.api import Client\n")]);
        impfmt(
            dir.path(),
            &["fix", "--rename", "legacy.api=core.api", "--invert", "app.py"],
        );
        assert_eq!(read(&dir, "app.py"), "from legacy.api import Client\n");
    }

    #[test]
    fn config_file_is_discovered() {
        let dir = workspace(&[
            (".impfmt.json", r#"{"rename_map": {"old": "new"}}"#),
            ("app.py", "import old.thing\n"),
        ]);
        assert!(impfmt(dir.path(), &["fix", "app.py"]).status.success());
        assert_eq!(read(&dir, "app.py"), "import new.thing\n");
    }

    #[test]
    fn local_imports_can_be_disabled() {
        let files = [
            ("pkg/__init__.py", "from .core import Engine\n"),
            ("pkg/core.py", "class Engine:\n    pass\n"),
            ("pkg/app.py", "from pkg import Engine\n"),
        ];
        let dir = workspace(&files);
        impfmt(dir.path(), &["fix", "--no-local-imports", "pkg/app.py"]);
        assert_eq!(read(&dir, "pkg/app.py"), "from pkg import Engine\n");

        impfmt(dir.path(), &["fix", "pkg/app.py"]);
        assert_eq!(read(&dir, "pkg/app.py"), "from .core import Engine\n");
        assert_eq!(read(&dir, "pkg/__init__.py"), "from .core import Engine\n");
    }

    #[test]
    fn skipped_resolutions_are_reported() {
        let dir = workspace(&[
            ("pkg/__init__.py", "from .core import Engine\n"),
            ("pkg/app.py", "from pkg import Engine as E\n"),
        ]);
        let output = impfmt(dir.path(), &["--format", "json", "fix", "pkg/app.py"]);
        let report = json(&output);
        let skipped = &report["files"][0]["skipped"][0];
        assert_eq!(skipped["name"], "pkg.Engine");
        assert_eq!(skipped["line"], 1);
        assert_eq!(skipped["reason"], "aliased");
    }

    #[test]
    fn parse_errors_fail_the_file_but_not_the_run() {
        let dir = workspace(&[("bad.py", "from import x\n"), ("good.py", "import b\nimport a\n")]);
        let output = impfmt(dir.path(), &["--format", "json", "fix", "bad.py", "good.py"]);
        assert_eq!(output.status.code(), Some(3));
        let report = json(&output);
        assert_eq!(report["status"], "error");
        assert_eq!(report["files"][0]["status"], "failed");
        assert_eq!(report["files"][0]["error"]["details"]["line"], 1);
        assert_eq!(read(&dir, "bad.py"), "from import x\n");
        assert_eq!(read(&dir, "good.py"), "import a\nimport b\n");
    }

    #[test]
    fn parse_error_on_multibyte_token_is_reported() {
        let dir = workspace(&[("bad.py", "nom = é ü\n"), ("good.py", "import b\nimport a\n")]);
        let output = impfmt(dir.path(), &["fix", "bad.py", "good.py"]);
        assert_eq!(output.status.code(), Some(3));
        assert!(stdout(&output).contains("failed bad.py"));
        assert!(String::from_utf8_lossy(&output.stderr).contains("nom = é ü"));
        assert_eq!(read(&dir, "good.py"), "import a\nimport b\n");
    }

    #[test]
    fn missing_file_is_invalid_arguments() {
        let dir = workspace(&[]);
        let output = impfmt(dir.path(), &["fix", "absent.py"]);
        assert_eq!(output.status.code(), Some(2));
        assert!(stdout(&output).contains("failed absent.py"));
    }

    #[test]
    fn bad_rename_value_is_rejected_by_the_parser() {
        let dir = workspace(&[("app.py", "import os\n")]);
        let output = impfmt(dir.path(), &["fix", "--rename", "nonsense", "app.py"]);
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("invalid rename"));
    }
}

// ============================================================================
// list
// ============================================================================

mod list {
    use super::*;

    #[test]
    fn text_lines() {
        let dir = workspace(&[("app.py", "import os\n\ndef f():\n    from a import b\n")]);
        let output = impfmt(dir.path(), &["list", "app.py"]);
        assert!(output.status.success());
        assert_eq!(stdout(&output), "app.py:1: os\napp.py:4: a.b\n");
    }

    #[test]
    fn json_response() {
        let dir = workspace(&[("app.py", "import os, sys\n")]);
        let output = impfmt(dir.path(), &["--format", "json", "list", "app.py"]);
        let response = json(&output);
        assert_eq!(response["status"], "ok");
        assert_eq!(response["file"], "app.py");
        assert_eq!(response["symbols"][1]["name"], "sys");
    }

    #[test]
    fn errors_are_json_in_json_mode() {
        let dir = workspace(&[("bad.py", "import (\n")]);
        let output = impfmt(dir.path(), &["--format", "json", "list", "bad.py"]);
        assert_eq!(output.status.code(), Some(3));
        let response = json(&output);
        assert_eq!(response["status"], "error");
        assert_eq!(response["error"]["code"], 3);
    }
}

// ============================================================================
// add
// ============================================================================

mod add {
    use super::*;

    #[test]
    fn adds_below_header() {
        let dir = workspace(&[("app.py", "#!/usr/bin/env python\nimport sys\n\nmain()\n")]);
        let output = impfmt(dir.path(), &["add", "app.py", "os"]);
        assert!(output.status.success());
        assert_eq!(
            read(&dir, "app.py"),
            "#!/usr/bin/env python\nimport os\nimport sys\n\nmain()\n"
        );
    }

    #[test]
    fn present_name_is_a_no_op() {
        let dir = workspace(&[("app.py", "from os.path import join\n")]);
        let output = impfmt(dir.path(), &["add", "--check", "app.py", "os.path.join"]);
        assert!(output.status.success());
    }

    #[test]
    fn invalid_name_exits_with_invalid_arguments() {
        let dir = workspace(&[("app.py", "x = 1\n")]);
        let output = impfmt(dir.path(), &["add", "app.py", "not-a-name"]);
        assert_eq!(output.status.code(), Some(2));
        assert!(String::from_utf8_lossy(&output.stderr).contains("not-a-name"));
        assert_eq!(read(&dir, "app.py"), "x = 1\n");
    }
}
