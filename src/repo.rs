//! Read-only repository inspection for choosing what to review.

use crate::errors::SuiteError;
use crate::target::ReviewTarget;
use git2::{Repository, Sort, Status, StatusOptions};
use std::path::Path;

/// One entry of the recent-commit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub id: String,
    pub short_id: String,
    pub summary: String,
}

impl CommitSummary {
    /// `abc1234 Fix the thing`
    pub fn label(&self) -> String {
        format!("{} {}", self.short_id, self.summary)
    }
}

/// Number of changed paths, by where the change lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeCounts {
    pub staged: usize,
    pub unstaged: usize,
}

pub struct RepoInspector {
    repo: Repository,
}

impl RepoInspector {
    /// Find the repository containing `path`.
    pub fn discover(path: &Path) -> Result<Self, SuiteError> {
        let repo = Repository::discover(path).map_err(|e| SuiteError::NoReviewContext {
            reason: format!("{} is not inside a git repository ({})", path.display(), e.message()),
        })?;
        Ok(Self { repo })
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Resolve `rev` to a commit and return its short id.
    pub fn resolve_ref(&self, rev: &str) -> Result<String, SuiteError> {
        let object = self
            .repo
            .revparse_single(rev)
            .map_err(|e| SuiteError::invalid_target(rev, e.message()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| SuiteError::invalid_target(rev, "does not name a commit"))?;
        Ok(short_id(&commit))
    }

    /// Up to `limit` commits reachable from HEAD, newest first.
    ///
    /// An unborn HEAD yields an empty list.
    pub fn recent_commits(&self, limit: usize) -> Result<Vec<CommitSummary>, SuiteError> {
        if self.repo.head().is_err() {
            return Ok(Vec::new());
        }

        let mut walk = self.repo.revwalk().map_err(git_err)?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME).map_err(git_err)?;
        walk.push_head().map_err(git_err)?;

        let mut commits = Vec::new();
        for oid in walk.take(limit) {
            let commit = self.repo.find_commit(oid.map_err(git_err)?).map_err(git_err)?;
            commits.push(CommitSummary {
                id: commit.id().to_string(),
                short_id: short_id(&commit),
                summary: commit.summary().unwrap_or("").to_string(),
            });
        }
        Ok(commits)
    }

    /// Count staged and unstaged changes, untracked files included.
    pub fn change_counts(&self) -> Result<ChangeCounts, SuiteError> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        let statuses = self.repo.statuses(Some(&mut opts)).map_err(git_err)?;

        let staged_bits = Status::INDEX_NEW
            | Status::INDEX_MODIFIED
            | Status::INDEX_DELETED
            | Status::INDEX_RENAMED
            | Status::INDEX_TYPECHANGE;
        let unstaged_bits = Status::WT_NEW
            | Status::WT_MODIFIED
            | Status::WT_DELETED
            | Status::WT_RENAMED
            | Status::WT_TYPECHANGE;

        let mut counts = ChangeCounts::default();
        for entry in statuses.iter() {
            let status = entry.status();
            if status.intersects(staged_bits) {
                counts.staged += 1;
            }
            if status.intersects(unstaged_bits) {
                counts.unstaged += 1;
            }
        }
        Ok(counts)
    }

    /// Check that `target` can be reviewed in this repository.
    pub fn check_target(&self, target: &ReviewTarget) -> Result<(), SuiteError> {
        match target {
            ReviewTarget::Recent { base_ref } => self.resolve_ref(base_ref).map(|_| ()),
            ReviewTarget::Worktree | ReviewTarget::Staged | ReviewTarget::Pr(_) => Ok(()),
        }
    }
}

fn short_id(commit: &git2::Commit<'_>) -> String {
    commit
        .as_object()
        .short_id()
        .ok()
        .and_then(|buf| buf.as_str().map(str::to_string))
        .unwrap_or_else(|| commit.id().to_string()[..7].to_string())
}

fn git_err(e: git2::Error) -> SuiteError {
    SuiteError::Other(anyhow::anyhow!("git: {}", e.message()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();
        dir
    }

    fn commit_file(dir: &Path, name: &str, content: &str, msg: &str) {
        let repo = Repository::open(dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("test", "test@test.com").unwrap();
        if let Ok(head) = repo.head() {
            let parent = head.peel_to_commit().unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, msg, &tree, &[&parent])
                .unwrap();
        } else {
            repo.commit(Some("HEAD"), &sig, &sig, msg, &tree, &[])
                .unwrap();
        }
    }

    #[test]
    fn discover_outside_repo_is_no_review_context() {
        let dir = TempDir::new().unwrap();
        // The temp dir may itself live inside a checkout; only assert the
        // error shape when discovery actually fails.
        if let Err(e) = RepoInspector::discover(dir.path()) {
            assert!(matches!(e, SuiteError::NoReviewContext { .. }));
        }
    }

    #[test]
    fn discover_from_subdirectory() {
        let dir = setup_repo();
        let sub = dir.path().join("src");
        fs::create_dir_all(&sub).unwrap();
        let repo = RepoInspector::discover(&sub).unwrap();
        assert!(repo.workdir().is_some());
    }

    #[test]
    fn unborn_head_has_no_commits() {
        let dir = setup_repo();
        let repo = RepoInspector::discover(dir.path()).unwrap();
        assert!(repo.recent_commits(10).unwrap().is_empty());
    }

    #[test]
    fn recent_commits_newest_first_and_limited() {
        let dir = setup_repo();
        commit_file(dir.path(), "a.txt", "1", "first");
        commit_file(dir.path(), "a.txt", "2", "second");
        commit_file(dir.path(), "a.txt", "3", "third");
        let repo = RepoInspector::discover(dir.path()).unwrap();

        let commits = repo.recent_commits(2).unwrap();

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].summary, "third");
        assert_eq!(commits[0].id.len(), 40);
        assert!(commits[0].label().ends_with(" third"));
    }

    #[test]
    fn resolve_ref_accepts_head_relative_and_rejects_garbage() {
        let dir = setup_repo();
        commit_file(dir.path(), "a.txt", "1", "first");
        commit_file(dir.path(), "a.txt", "2", "second");
        let repo = RepoInspector::discover(dir.path()).unwrap();

        assert!(repo.resolve_ref("HEAD~1").is_ok());
        let err = repo.resolve_ref("no-such-branch").unwrap_err();
        assert!(matches!(err, SuiteError::InvalidTarget { ref input, .. } if input == "no-such-branch"));
        assert!(repo.check_target(&ReviewTarget::recent("nope")).is_err());
        assert!(repo.check_target(&ReviewTarget::recent("HEAD~1")).is_ok());
    }

    #[test]
    fn change_counts_split_staged_and_unstaged() {
        let dir = setup_repo();
        commit_file(dir.path(), "a.txt", "1", "init");
        fs::write(dir.path().join("a.txt"), "changed").unwrap();
        fs::write(dir.path().join("b.txt"), "new").unwrap();
        {
            let repo = Repository::open(dir.path()).unwrap();
            let mut index = repo.index().unwrap();
            index.add_path(Path::new("b.txt")).unwrap();
            index.write().unwrap();
        }
        let repo = RepoInspector::discover(dir.path()).unwrap();

        let counts = repo.change_counts().unwrap();

        assert_eq!(counts, ChangeCounts { staged: 1, unstaged: 1 });
    }
}
