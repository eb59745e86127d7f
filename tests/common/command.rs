use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

/// Fixed commit date so ids and dates in output are stable
pub const COMMIT_DATE: &str = "2023-01-01 12:00:00 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Repository with `1.txt`, `a/2.txt` and `a/b/3.txt` committed on master
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    for (path, content) in [("1.txt", "one"), ("a/2.txt", "two"), ("a/b/3.txt", "three")] {
        write_file(FileSpec::new(
            repository_dir.path().join(path),
            content.to_string(),
        ));
    }

    run_twig_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    twig_commit(repository_dir.path(), "Initial files")
        .assert()
        .success();

    repository_dir
}

pub fn run_twig_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("twig").expect("Failed to find twig binary");
    cmd.envs(vec![("NO_COLOR", "1"), ("TWIG_LOG", "off")]);
    cmd.env_remove("TWIG_COMMIT_DATE");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn twig_commit(dir: &Path, message: &str) -> Command {
    let mut cmd = run_twig_command(dir, &["commit", "-m", message]);
    cmd.env("TWIG_COMMIT_DATE", COMMIT_DATE);
    cmd
}

/// Stage everything and commit it
pub fn twig_commit_all(dir: &Path, message: &str) {
    run_twig_command(dir, &["add", "."]).assert().success();
    twig_commit(dir, message).assert().success();
}

/// The commit id HEAD resolves to
pub fn get_head_commit_sha(dir: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let head_path = dir.join(".twig").join("HEAD");
    let head_content = std::fs::read_to_string(head_path)?;

    // HEAD holds either a raw id or "ref: refs/heads/<name>"
    if let Some(ref_path) = head_content.trim().strip_prefix("ref: ") {
        let ref_file = dir.join(".twig").join(ref_path);
        let commit_sha = std::fs::read_to_string(ref_file)?;
        Ok(commit_sha.trim().to_string())
    } else {
        Ok(head_content.trim().to_string())
    }
}

pub fn get_branch_commit_sha(dir: &Path, branch: &str) -> Result<String, Box<dyn std::error::Error>> {
    let ref_file = dir.join(".twig").join("refs").join("heads").join(branch);
    Ok(std::fs::read_to_string(ref_file)?.trim().to_string())
}

pub fn read_head(dir: &Path) -> Result<String, Box<dyn std::error::Error>> {
    Ok(std::fs::read_to_string(dir.join(".twig").join("HEAD"))?
        .trim()
        .to_string())
}
