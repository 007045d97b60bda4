use std::fs;
use std::process::Command;

use tempfile::TempDir;

#[test]
fn list_prints_catalogued_shaders() {
    let root = TempDir::new().unwrap();
    let shader_dir = root.path().join("shaders");
    fs::create_dir_all(&shader_dir).unwrap();
    fs::write(shader_dir.join("plasma.frag"), "void main() {}").unwrap();
    fs::write(shader_dir.join("rings.frag"), "void main() {}").unwrap();
    fs::write(shader_dir.join("README.md"), "not a shader").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_fragview"))
        .current_dir(root.path())
        .args(["--shader-dir"])
        .arg(&shader_dir)
        .arg("--list")
        .output()
        .expect("failed to run fragview --list");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("plasma"));
    assert!(stdout.contains("rings"));
    assert!(!stdout.contains("README"));
}

#[test]
fn missing_shader_directory_fails() {
    let root = TempDir::new().unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_fragview"))
        .current_dir(root.path())
        .args(["--shader-dir", "does-not-exist", "--list"])
        .status()
        .expect("failed to run fragview");

    assert!(!status.success());
}
