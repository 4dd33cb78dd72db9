//! Integration tests for solution discovery, the dirty-tree guard and commits

use bump_version::{
    commands::{self, SolutionBump, SolutionOutcome},
    error::{BumpError, Result},
    git::{GitCli, VersionControl},
    solution::Solution,
    version::Version,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Records every call and answers `status` from a canned map
#[derive(Default)]
struct RecordingVcs {
    statuses: HashMap<PathBuf, String>,
    calls: Mutex<Vec<String>>,
}

impl RecordingVcs {
    fn with_status(mut self, dir: &Path, status: &str) -> Self {
        self.statuses
            .insert(fs::canonicalize(dir).unwrap(), status.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, dir: &Path, call: String) {
        let name = dir.file_name().unwrap().to_string_lossy().to_string();
        self.calls.lock().unwrap().push(format!("{name}: {call}"));
    }
}

impl VersionControl for RecordingVcs {
    async fn status(&self, dir: &Path) -> Result<String> {
        self.record(dir, "status --porcelain".to_string());
        Ok(self.statuses.get(dir).cloned().unwrap_or_default())
    }

    async fn stage_all(&self, dir: &Path) -> Result<()> {
        self.record(dir, "add .".to_string());
        Ok(())
    }

    async fn commit(&self, dir: &Path, message: &str) -> Result<()> {
        self.record(dir, format!("commit -m {message}"));
        Ok(())
    }
}

const PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <Version>1.0.2</Version>
    <AssemblyVersion>1.0.2</AssemblyVersion>
  </PropertyGroup>
</Project>
"#;

/// Creates `<root>/<name>/<name>/<name>.csproj` and returns the solution directory
fn create_solution(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(dir.join(name)).unwrap();
    fs::write(dir.join(name).join(format!("{name}.csproj")), PROJECT).unwrap();
    dir
}

fn project_file(solution_dir: &Path) -> PathBuf {
    Solution::expected_project_path(solution_dir)
}

// ============================================================================
// Solution with a recording version-control fake
// ============================================================================

#[tokio::test]
async fn test_has_uncommitted_changes() {
    let root = TempDir::new().unwrap();
    let dir = create_solution(root.path(), "Billing");
    let solution = Solution::open(fs::canonicalize(&dir).unwrap()).unwrap();

    let clean = RecordingVcs::default().with_status(&dir, "  \n");
    assert!(!solution.has_uncommitted_changes(&clean).await.unwrap());

    let dirty = RecordingVcs::default().with_status(&dir, "?? notes.txt\n");
    assert!(solution.has_uncommitted_changes(&dirty).await.unwrap());
}

#[tokio::test]
async fn test_commit_stages_before_committing() {
    let root = TempDir::new().unwrap();
    let dir = create_solution(root.path(), "Billing");
    let solution = Solution::open(&dir).unwrap();
    let vcs = RecordingVcs::default();

    solution.commit(&vcs, "Bumped version").await.unwrap();
    assert_eq!(
        vcs.calls(),
        vec!["Billing: add .", "Billing: commit -m Bumped version"]
    );
}

#[tokio::test]
async fn test_dirty_solution_aborts_without_writing() {
    let root = TempDir::new().unwrap();
    let dir = create_solution(root.path(), "Billing");
    let vcs = RecordingVcs::default().with_status(&dir, " M Billing/Billing.csproj\n");

    let outcome = commands::bump_solutions(root.path(), 3, "Bumped version", &vcs)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SolutionOutcome::Aborted {
            dirty: vec!["Billing".to_string()]
        }
    );
    assert_eq!(fs::read_to_string(project_file(&dir)).unwrap(), PROJECT);
    assert_eq!(vcs.calls(), vec!["Billing: status --porcelain"]);
}

#[tokio::test]
async fn test_one_dirty_solution_blocks_all() {
    let root = TempDir::new().unwrap();
    let clean = create_solution(root.path(), "Alpha");
    let dirty = create_solution(root.path(), "Beta");
    let vcs = RecordingVcs::default().with_status(&dirty, "?? scratch.txt\n");

    let outcome = commands::bump_solutions(root.path(), 3, "Bumped version", &vcs)
        .await
        .unwrap();

    assert!(matches!(outcome, SolutionOutcome::Aborted { ref dirty } if dirty == &["Beta"]));
    assert_eq!(fs::read_to_string(project_file(&clean)).unwrap(), PROJECT);
    assert!(!vcs.calls().iter().any(|call| call.contains("commit")));
}

#[tokio::test]
async fn test_clean_solution_is_bumped_and_committed() {
    let root = TempDir::new().unwrap();
    let dir = create_solution(root.path(), "Billing");
    let vcs = RecordingVcs::default();

    let outcome = commands::bump_solutions(root.path(), 3, "Bumped version", &vcs)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SolutionOutcome::Bumped(vec![SolutionBump {
            solution: "Billing".to_string(),
            old: Version::parse("1.0.2").unwrap(),
            new: Version::parse("1.0.3").unwrap(),
        }])
    );
    assert_eq!(
        fs::read_to_string(project_file(&dir)).unwrap(),
        PROJECT.replace("1.0.2", "1.0.3")
    );
    assert_eq!(
        vcs.calls(),
        vec![
            "Billing: status --porcelain",
            "Billing: add .",
            "Billing: commit -m Bumped version",
        ]
    );
}

#[tokio::test]
async fn test_root_is_used_when_no_subdirectory_qualifies() {
    let parent = TempDir::new().unwrap();
    let dir = create_solution(parent.path(), "Single");
    let vcs = RecordingVcs::default();

    let outcome = commands::bump_solutions(&dir, 3, "Bumped version", &vcs)
        .await
        .unwrap();

    assert!(matches!(outcome, SolutionOutcome::Bumped(ref bumped) if bumped.len() == 1));
    assert!(fs::read_to_string(project_file(&dir))
        .unwrap()
        .contains("<Version>1.0.3</Version>"));
}

#[tokio::test]
async fn test_missing_project_is_not_found() {
    let root = TempDir::new().unwrap();
    let vcs = RecordingVcs::default();

    let err = commands::bump_solutions(root.path(), 3, "Bumped version", &vcs)
        .await
        .unwrap_err();
    assert!(matches!(err, BumpError::NotFound(_)));
    assert!(vcs.calls().is_empty());
}

// ============================================================================
// Real repository through the git command-line tool
// ============================================================================

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Creates a git repository at `<root>/Billing` with the project committed
fn create_test_repo(root: &Path) -> PathBuf {
    let dir = create_solution(root, "Billing");
    let repo = git2::Repository::init(&dir).unwrap();

    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();

    let mut index = repo.index().unwrap();
    index
        .add_path(Path::new("Billing/Billing.csproj"))
        .unwrap();
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = repo.signature().unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
        .unwrap();

    dir
}

#[tokio::test]
async fn test_git_cli_commits_bump() {
    if !git_available() {
        eprintln!("git not found on PATH, skipping");
        return;
    }
    let root = TempDir::new().unwrap();
    let dir = create_test_repo(root.path());

    let outcome = commands::bump_solutions(root.path(), 3, "Bumped version", &GitCli::default())
        .await
        .unwrap();
    assert!(matches!(outcome, SolutionOutcome::Bumped(_)));

    let repo = git2::Repository::open(&dir).unwrap();
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(head.message().map(str::trim), Some("Bumped version"));
    assert!(repo.statuses(None).unwrap().is_empty());
    assert!(fs::read_to_string(project_file(&dir))
        .unwrap()
        .contains("<AssemblyVersion>1.0.3</AssemblyVersion>"));
}

#[tokio::test]
async fn test_git_cli_dirty_tree_blocks_bump() {
    if !git_available() {
        eprintln!("git not found on PATH, skipping");
        return;
    }
    let root = TempDir::new().unwrap();
    let dir = create_test_repo(root.path());
    fs::write(dir.join("notes.txt"), "work in progress").unwrap();

    let outcome = commands::bump_solutions(root.path(), 3, "Bumped version", &GitCli::default())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        SolutionOutcome::Aborted {
            dirty: vec!["Billing".to_string()]
        }
    );

    let repo = git2::Repository::open(&dir).unwrap();
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(head.message(), Some("Initial commit"));
    assert_eq!(fs::read_to_string(project_file(&dir)).unwrap(), PROJECT);
}

#[tokio::test]
async fn test_git_cli_outside_repository_fails() {
    if !git_available() {
        eprintln!("git not found on PATH, skipping");
        return;
    }
    let root = TempDir::new().unwrap();
    let git = GitCli::default();
    let err = git.status(root.path()).await.unwrap_err();
    assert!(matches!(err, BumpError::ToolFailed { .. }));
}
