//! Fixture repositories for pipeline tests

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write `content` to `root/rel`, creating parent directories
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Repository with a README and nothing else
pub fn readme_only_repo() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "README.md", "# Demo\n\nA small demo project.\n");
    dir
}

/// Rust project with docs, a manifest and a couple of rule hits
pub fn sample_repo() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(
        root,
        "README.md",
        "# Sample\n\nSample service.\n\n## Installation\n\nRun `cargo build --release`.\n",
    );
    write_file(
        root,
        "docs/architecture.md",
        "# Architecture\n\nRequests enter through `src/main.rs` and are handled in `src/handlers.rs`.\n",
    );
    write_file(
        root,
        "Cargo.toml",
        "[package]\nname = \"sample\"\nversion = \"0.1.0\"\n\n[dependencies]\nserde = \"1\"\n\n[dev-dependencies]\ntempfile = \"3\"\n",
    );
    write_file(
        root,
        "src/main.rs",
        "fn main() {\n    let password = \"hunter2\";\n    // TODO: read from env\n    println!(\"{}\", password);\n}\n",
    );
    write_file(root, "scripts/tool.py", "print(\"starting\")\n");
    dir
}
