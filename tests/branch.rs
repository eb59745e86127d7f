use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;
use common::command::{
    get_branch_commit_sha, get_head_commit_sha, init_repository_dir, read_head, run_twig_command,
    twig_commit_all,
};
use common::file::{FileSpec, write_file};

#[rstest]
fn new_branch_points_at_the_current_commit_without_moving_head(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    run_twig_command(dir, &["branch", "feature"])
        .assert()
        .success();

    assert_eq!(
        get_branch_commit_sha(dir, "feature")?,
        get_head_commit_sha(dir)?
    );
    assert_eq!(read_head(dir)?, "ref: refs/heads/master");

    Ok(())
}

#[rstest]
fn branch_does_not_follow_later_commits(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "feature"])
        .assert()
        .success();
    let fork_point = get_head_commit_sha(dir)?;

    write_file(FileSpec::new(dir.join("1.txt"), "changed".to_string()));
    twig_commit_all(dir, "on master");

    assert_eq!(get_branch_commit_sha(dir, "feature")?, fork_point);
    assert_ne!(get_branch_commit_sha(dir, "master")?, fork_point);

    Ok(())
}

#[rstest]
#[case::simple("feature")]
#[case::hierarchical("feature/login")]
#[case::with_dashes("fix-123")]
fn valid_branch_names_are_accepted(init_repository_dir: TempDir, #[case] name: &str) {
    let dir = init_repository_dir.path();

    run_twig_command(dir, &["branch", name]).assert().success();

    assert!(dir.join(".twig/refs/heads").join(name).is_file());
}

#[rstest]
#[case::double_dot("a..b")]
#[case::leading_dot(".hidden")]
#[case::lock_suffix("topic.lock")]
#[case::trailing_slash("topic/")]
#[case::space("has space")]
fn invalid_branch_names_are_rejected(init_repository_dir: TempDir, #[case] name: &str) {
    run_twig_command(init_repository_dir.path(), &["branch", name])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid branch name"));
}

#[rstest]
fn duplicate_branch_is_rejected(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "feature"])
        .assert()
        .success();

    run_twig_command(dir, &["branch", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a branch named feature already exists"));
}

#[rstest]
fn deleting_a_branch_keeps_its_commits(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["branch", "feature"])
        .assert()
        .success();
    run_twig_command(dir, &["checkout", "feature"])
        .assert()
        .success();
    write_file(FileSpec::new(dir.join("feature.txt"), "work".to_string()));
    twig_commit_all(dir, "feature work");
    let feature_commit = get_branch_commit_sha(dir, "feature")?;
    run_twig_command(dir, &["checkout", "master"])
        .assert()
        .success();

    run_twig_command(dir, &["branch", "-d", "feature"])
        .assert()
        .success()
        .stdout(format!(
            "Deleted branch feature (was {})\n",
            &feature_commit[..7]
        ));

    assert!(!dir.join(".twig/refs/heads/feature").exists());
    run_twig_command(dir, &["find", "feature work"])
        .assert()
        .success()
        .stdout(format!("{feature_commit}\n"));

    Ok(())
}

#[rstest]
fn current_branch_cannot_be_deleted(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();

    run_twig_command(dir, &["branch", "-d", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot remove the current branch"));

    assert!(dir.join(".twig/refs/heads/master").is_file());
}

#[rstest]
fn deleting_an_unknown_branch_fails(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["branch", "-d", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a branch named ghost does not exist"));
}
