use std::path::{Path, PathBuf};

#[allow(dead_code)]
pub fn dockgen_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dockgen"))
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("stacks")
        .join(name)
}

/// Copies a fixture into a fresh temp dir so tests can write into it
#[allow(dead_code)]
pub fn copy_fixture(name: &str) -> (tempfile::TempDir, PathBuf) {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let target = temp.path().join(name);
    copy_dir(&fixture_path(name), &target);
    (temp, target)
}

fn copy_dir(from: &Path, to: &Path) {
    std::fs::create_dir_all(to).expect("Failed to create fixture copy");
    for entry in std::fs::read_dir(from).expect("Failed to read fixture") {
        let entry = entry.expect("Failed to read fixture entry");
        let dest = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir(&entry.path(), &dest);
        } else {
            std::fs::copy(entry.path(), dest).expect("Failed to copy fixture file");
        }
    }
}
