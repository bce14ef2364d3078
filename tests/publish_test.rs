//! Integration tests: the full publish workflow against a local bare
//! repository — state selection, branch handling, purge, error aborts, and
//! workspace cleanup.

use std::path::{Path, PathBuf};

use gitcopy::core::copier::{CopyEngine, CopyReport, CopyRequest, MarkupCopier};
use gitcopy::core::error::{CopyError, PublishError};
use gitcopy::core::publisher::{DEFAULT_COMMIT_MESSAGE, PublishRequest, Publisher};
use gitcopy::core::remote::{self, CloneOptions};
use gitcopy::core::repo::CloneRepo;

use sha2::{Digest, Sha256};

// ---------- Helpers ----------

const SOURCE_FILE: &str = "test.txt
:state-start: start
Hello!
:state-end:
:state-start: final
Goodbye!
:state-end:
:remove-start:
Do not copy this.
:remove-end:
";

/// A destination bare repo seeded with one commit, plus a source tree.
struct Fixture {
    _tmp: tempfile::TempDir,
    bare: PathBuf,
    source: PathBuf,
    /// The bare repo's default branch (whatever HEAD points at)
    seed_branch: String,
}

fn setup() -> Fixture {
    let tmp = tempfile::tempdir().unwrap();

    let bare = tmp.path().join("repo.git");
    let bare_repo = git2::Repository::init_bare(&bare).unwrap();
    let seed_branch = bare_repo
        .find_reference("HEAD")
        .unwrap()
        .symbolic_target()
        .unwrap()
        .trim_start_matches("refs/heads/")
        .to_string();

    // Seed the destination with one commit on its default branch.
    let seed_clone = tmp.path().join("seed");
    remote::clone(
        bare.to_str().unwrap(),
        &seed_clone,
        &CloneOptions {
            branch: None,
            depth: 1,
        },
    )
    .unwrap();
    std::fs::write(seed_clone.join("test.txt"), "Hello, world!\n").unwrap();
    std::fs::write(seed_clone.join("trash.txt"), "Delete me\n").unwrap();
    let repo = CloneRepo::open(&seed_clone).unwrap();
    repo.create_branch(&seed_branch, None).unwrap();
    repo.stage_all().unwrap();
    repo.commit("First commit").unwrap();
    remote::push(&seed_clone, Some(seed_branch.as_str())).unwrap();

    let source = tmp.path().join("source");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::write(source.join("test.txt"), SOURCE_FILE).unwrap();

    Fixture {
        _tmp: tmp,
        bare,
        source,
        seed_branch,
    }
}

fn request(fixture: &Fixture) -> PublishRequest {
    PublishRequest {
        source_root: fixture.source.clone(),
        destination_repo: fixture.bare.to_str().unwrap().to_string(),
        branch: None,
        start_point: None,
        commit_message: None,
        delete_everything: false,
        ignore_patterns: Vec::new(),
        state: None,
    }
}

async fn publish(req: &PublishRequest) -> Result<gitcopy::core::publisher::PublishReport, PublishError> {
    Publisher::new(MarkupCopier).publish(req).await
}

// Inspect the bare repository directly rather than re-cloning.

fn tip<'r>(repo: &'r git2::Repository, branch: &str) -> git2::Commit<'r> {
    repo.find_reference(&format!("refs/heads/{}", branch))
        .unwrap()
        .peel_to_commit()
        .unwrap()
}

fn commit_count(fixture: &Fixture, branch: &str) -> usize {
    let repo = git2::Repository::open_bare(&fixture.bare).unwrap();
    let mut walk = repo.revwalk().unwrap();
    walk.push(tip(&repo, branch).id()).unwrap();
    walk.count()
}

fn tip_message(fixture: &Fixture, branch: &str) -> String {
    let repo = git2::Repository::open_bare(&fixture.bare).unwrap();
    tip(&repo, branch).message().unwrap().trim().to_string()
}

fn file_at_tip(fixture: &Fixture, branch: &str, path: &str) -> Option<String> {
    let repo = git2::Repository::open_bare(&fixture.bare).unwrap();
    let commit = tip(&repo, branch);
    let tree = commit.tree().unwrap();
    let entry = tree.get_path(Path::new(path)).ok()?;
    let blob = repo.find_blob(entry.id()).unwrap();
    Some(String::from_utf8(blob.content().to_vec()).unwrap())
}

/// Temp-dir entries left behind for this fixture's destination (the
/// workspace prefix embeds a digest of the destination identifier).
fn leftover_workspaces(fixture: &Fixture) -> Vec<PathBuf> {
    let mut hasher = Sha256::new();
    hasher.update(fixture.bare.to_str().unwrap().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    let prefix = format!("gitcopy-{}-", &digest[..8]);

    std::fs::read_dir(std::env::temp_dir())
        .unwrap()
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().starts_with(&prefix))
                .unwrap_or(false)
        })
        .collect()
}

// ---------- Tests ----------

/// Publishing the same source three times with state unset, "start", and
/// "final" yields three distinct commits with the matching file contents.
#[tokio::test]
async fn publish_with_states_creates_distinct_commits() {
    let fixture = setup();
    let branch = fixture.seed_branch.clone();

    let mut req = request(&fixture);
    req.branch = Some(branch.clone());
    req.commit_message = Some("It works!".to_string());
    let report = publish(&req).await.unwrap();
    assert!(!report.branch_created);

    assert_eq!(tip_message(&fixture, &branch), "It works!");
    assert_eq!(commit_count(&fixture, &branch), 2);
    assert_eq!(
        file_at_tip(&fixture, &branch, "test.txt").unwrap(),
        "test.txt\n"
    );
    // No purge requested, so the seeded file survives.
    assert_eq!(
        file_at_tip(&fixture, &branch, "trash.txt").unwrap(),
        "Delete me\n"
    );

    req.commit_message = Some("Final state".to_string());
    req.state = Some("final".to_string());
    publish(&req).await.unwrap();
    assert_eq!(tip_message(&fixture, &branch), "Final state");
    assert_eq!(commit_count(&fixture, &branch), 3);
    assert_eq!(
        file_at_tip(&fixture, &branch, "test.txt").unwrap(),
        "test.txt\nGoodbye!\n"
    );

    req.commit_message = Some("Start state".to_string());
    req.state = Some("start".to_string());
    publish(&req).await.unwrap();
    assert_eq!(tip_message(&fixture, &branch), "Start state");
    assert_eq!(commit_count(&fixture, &branch), 4);
    assert_eq!(
        file_at_tip(&fixture, &branch, "test.txt").unwrap(),
        "test.txt\nHello!\n"
    );
}

/// With no branch in the request, the clone targets the destination's
/// default branch and the push updates that same branch. The commit
/// message falls back to the default literal.
#[tokio::test]
async fn publish_without_branch_updates_default_branch() {
    let fixture = setup();

    let req = request(&fixture);
    let report = publish(&req).await.unwrap();

    assert!(report.branch.is_none());
    assert!(!report.branch_created);
    assert_eq!(commit_count(&fixture, &fixture.seed_branch), 2);
    assert_eq!(
        tip_message(&fixture, &fixture.seed_branch),
        DEFAULT_COMMIT_MESSAGE
    );
    assert_eq!(
        file_at_tip(&fixture, &fixture.seed_branch, "test.txt").unwrap(),
        "test.txt\n"
    );
}

/// New branches are created from the given start point; an existing branch
/// is reused in place.
#[tokio::test]
async fn publish_creates_and_reuses_branches() {
    let fixture = setup();
    let main = fixture.seed_branch.clone();

    let mut req = request(&fixture);
    req.branch = Some(main.clone());
    req.commit_message = Some("It works!".to_string());
    publish(&req).await.unwrap();
    let main_tip = {
        let repo = git2::Repository::open_bare(&fixture.bare).unwrap();
        tip(&repo, &main).id().to_string()
    };

    // New branch "final" from the main tip.
    let mut req = request(&fixture);
    req.branch = Some("final".to_string());
    req.commit_message = Some("Final state".to_string());
    req.state = Some("final".to_string());
    req.start_point = Some(main_tip.clone());
    let report = publish(&req).await.unwrap();
    assert!(report.branch_created);
    assert_eq!(commit_count(&fixture, "final"), 3);
    assert_eq!(
        file_at_tip(&fixture, "final", "test.txt").unwrap(),
        "test.txt\nGoodbye!\n"
    );

    // New branch "start", also from the main tip — not from "final".
    let mut req = request(&fixture);
    req.branch = Some("start".to_string());
    req.commit_message = Some("Start state".to_string());
    req.state = Some("start".to_string());
    req.start_point = Some(main_tip);
    publish(&req).await.unwrap();
    assert_eq!(commit_count(&fixture, "start"), 3);
    assert_eq!(
        file_at_tip(&fixture, "start", "test.txt").unwrap(),
        "test.txt\nHello!\n"
    );

    // "final" now exists remotely: reused in place, no new branch.
    let mut req = request(&fixture);
    req.branch = Some("final".to_string());
    req.commit_message = Some("No state".to_string());
    let report = publish(&req).await.unwrap();
    assert!(!report.branch_created);
    assert_eq!(commit_count(&fixture, "final"), 4);
    assert_eq!(
        file_at_tip(&fixture, "final", "test.txt").unwrap(),
        "test.txt\n"
    );
}

/// A new branch without a start point branches from the default tip.
#[tokio::test]
async fn publish_new_branch_without_start_point() {
    let fixture = setup();

    let mut req = request(&fixture);
    req.branch = Some("docs".to_string());
    let report = publish(&req).await.unwrap();

    assert!(report.branch_created);
    assert_eq!(commit_count(&fixture, "docs"), 2);
    // Seeded content is still reachable from the new branch's parent.
    assert_eq!(
        file_at_tip(&fixture, "docs", "trash.txt").unwrap(),
        "Delete me\n"
    );
}

/// delete_everything purges the clone before copying: files the copy step
/// does not re-create do not reappear after commit.
#[tokio::test]
async fn delete_everything_purges_stale_files() {
    let fixture = setup();
    let branch = fixture.seed_branch.clone();

    let mut req = request(&fixture);
    req.branch = Some(branch.clone());
    req.commit_message = Some("It works!".to_string());
    req.delete_everything = true;
    publish(&req).await.unwrap();

    assert_eq!(commit_count(&fixture, &branch), 2);
    assert_eq!(
        file_at_tip(&fixture, &branch, "test.txt").unwrap(),
        "test.txt\n"
    );
    assert!(file_at_tip(&fixture, &branch, "trash.txt").is_none());
}

/// Ignore patterns keep matching source files out of the published tree.
#[tokio::test]
async fn ignore_patterns_filter_published_tree() {
    let fixture = setup();
    std::fs::write(fixture.source.join("debug.log"), "noise\n").unwrap();

    let mut req = request(&fixture);
    req.branch = Some(fixture.seed_branch.clone());
    req.ignore_patterns = vec!["*.log".to_string()];
    publish(&req).await.unwrap();

    assert!(file_at_tip(&fixture, &fixture.seed_branch, "debug.log").is_none());
    assert!(file_at_tip(&fixture, &fixture.seed_branch, "test.txt").is_some());
}

/// Malformed markup anywhere in the source aborts the publish before any
/// commit or push happens.
#[tokio::test]
async fn markup_errors_abort_before_commit() {
    let fixture = setup();
    std::fs::write(
        fixture.source.join("broken.md"),
        ":state-start: s\nnever closed\n",
    )
    .unwrap();

    let mut req = request(&fixture);
    req.branch = Some(fixture.seed_branch.clone());
    let err = publish(&req).await.unwrap_err();

    assert!(matches!(err, PublishError::Content(_)));
    assert_eq!(commit_count(&fixture, &fixture.seed_branch), 1);
    assert_eq!(tip_message(&fixture, &fixture.seed_branch), "First commit");
}

/// The Publisher consumes the engine through its contract: any engine that
/// reports errors prevents the commit, regardless of what it wrote.
#[tokio::test]
async fn failing_engine_prevents_commit() {
    struct FailingEngine;

    #[async_trait::async_trait]
    impl CopyEngine for FailingEngine {
        async fn copy(&self, _request: &CopyRequest) -> CopyReport {
            CopyReport {
                files_written: 0,
                errors: vec![CopyError::Io {
                    path: PathBuf::from("simulated"),
                    message: "listener blew up".to_string(),
                }],
            }
        }
    }

    let fixture = setup();
    let mut req = request(&fixture);
    req.branch = Some(fixture.seed_branch.clone());

    let err = Publisher::new(FailingEngine).publish(&req).await.unwrap_err();
    match err {
        PublishError::Content(errors) => assert_eq!(errors.len(), 1),
        other => panic!("expected Content error, got {:?}", other),
    }
    assert_eq!(commit_count(&fixture, &fixture.seed_branch), 1);
}

/// The temporary clone directory is gone after the invocation completes,
/// on success and on failure alike.
#[tokio::test]
async fn workspace_removed_on_all_exit_paths() {
    let fixture = setup();

    let mut req = request(&fixture);
    req.branch = Some(fixture.seed_branch.clone());
    publish(&req).await.unwrap();
    assert!(leftover_workspaces(&fixture).is_empty());

    // Force a content failure and check again.
    std::fs::write(fixture.source.join("broken.md"), ":remove-start:\n").unwrap();
    publish(&req).await.unwrap_err();
    assert!(leftover_workspaces(&fixture).is_empty());

    // And a version-control failure: a start point that cannot resolve.
    std::fs::remove_file(fixture.source.join("broken.md")).unwrap();
    let mut req = request(&fixture);
    req.branch = Some("unborn".to_string());
    req.start_point = Some("does-not-exist".to_string());
    let err = publish(&req).await.unwrap_err();
    assert!(matches!(err, PublishError::VersionControl { .. }));
    assert!(leftover_workspaces(&fixture).is_empty());
}
