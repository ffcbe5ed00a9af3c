use crate::common::file::{create_directory, write_tree};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn workspace_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// `old/` and `new/` side by side with one entry of every status
///
/// - `a.txt` and `sub/c.txt` are identical
/// - `b.txt` differs
/// - `only_old.txt` and `gone/` only exist in `old/`
/// - `only_new.txt` only exists in `new/`
#[fixture]
pub fn changed_trees_dir(workspace_dir: TempDir) -> TempDir {
    write_tree(
        &workspace_dir.path().join("old"),
        &[
            ("a.txt", "same"),
            ("b.txt", "old"),
            ("only_old.txt", "removed"),
            ("gone/x.txt", "x"),
            ("sub/c.txt", "c"),
        ],
    );
    write_tree(
        &workspace_dir.path().join("new"),
        &[
            ("a.txt", "same"),
            ("b.txt", "new!"),
            ("only_new.txt", "added"),
            ("sub/c.txt", "c"),
        ],
    );

    workspace_dir
}

/// The same project below an extra `release/` level on the old side
#[fixture]
pub fn wrapped_trees_dir(workspace_dir: TempDir) -> TempDir {
    let files = [("app/main.rs", "fn main() {}"), ("app/lib.rs", "pub mod app;")];
    write_tree(&workspace_dir.path().join("old").join("release"), &files);
    write_tree(&workspace_dir.path().join("new"), &files);

    workspace_dir
}

#[fixture]
pub fn empty_trees_dir(workspace_dir: TempDir) -> TempDir {
    create_directory(&workspace_dir.path().join("old"));
    create_directory(&workspace_dir.path().join("new"));

    workspace_dir
}

pub fn run_treecmp_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("treecmp").expect("Failed to find treecmp binary");
    cmd.envs(vec![("NO_COLOR", "1")]);
    cmd.env_remove("RUST_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}
