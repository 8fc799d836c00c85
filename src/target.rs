//! Review targets: what diff or commit range a suite run inspects.
//!
//! Each variant renders to a literal instruction block (the `{{SCOPE}}`
//! substitution) telling the agent which read-only commands to use.

use std::fmt;
use std::num::NonZeroU32;

/// The diff or range under review. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewTarget {
    /// Uncommitted changes in the working tree (staged and unstaged).
    Worktree,
    /// Changes staged in the index.
    Staged,
    /// A pull request on the code host.
    Pr(NonZeroU32),
    /// Commits after `base_ref` up to `HEAD`.
    Recent { base_ref: String },
}

impl ReviewTarget {
    /// Build a pull request target. Returns `None` for PR number 0.
    pub fn pr(number: u32) -> Option<Self> {
        NonZeroU32::new(number).map(Self::Pr)
    }

    /// Build a commit-range target.
    pub fn recent(base_ref: impl Into<String>) -> Self {
        Self::Recent {
            base_ref: base_ref.into(),
        }
    }

    /// Whether resolving this target needs a local git repository.
    pub fn needs_repository(&self) -> bool {
        !matches!(self, Self::Pr(_))
    }

    /// Short label used in status lines and notifications.
    pub fn short_label(&self) -> String {
        match self {
            Self::Worktree => "working tree".to_string(),
            Self::Staged => "staged changes".to_string(),
            Self::Pr(n) => format!("PR #{}", n),
            Self::Recent { base_ref } => format!("{}..HEAD", base_ref),
        }
    }

    /// Render the scope instructions substituted for `{{SCOPE}}`.
    pub fn scope_description(&self) -> String {
        match self {
            Self::Worktree => "\
Review the uncommitted changes in the working tree, both staged and unstaged.

Inspect them with read-only commands:
- `git status --short`
- `git diff HEAD`
- `git diff --stat HEAD`

Untracked files listed by `git status` are part of the change; read them directly.
Do not modify, stage, or commit anything."
                .to_string(),
            Self::Staged => "\
Review only the changes currently staged in the index.

Inspect them with read-only commands:
- `git status --short`
- `git diff --cached`
- `git diff --cached --stat`

Unstaged edits are out of scope.
Do not modify, stage, or commit anything."
                .to_string(),
            Self::Pr(number) => format!(
                "\
Review pull request #{number}.

Inspect it with read-only commands:
- `gh pr view {number}`
- `gh pr diff {number}`
- `gh pr view {number} --comments`

Read surrounding code in the local checkout when the diff alone is not enough.
Do not push, comment on, approve, or merge the pull request."
            ),
            Self::Recent { base_ref } => format!(
                "\
Review the commits after `{base_ref}` up to and including `HEAD`.

Inspect them with read-only commands:
- `git log --oneline {base_ref}..HEAD`
- `git diff {base_ref}..HEAD`
- `git show <commit>` for individual commits

Do not modify, rebase, or amend anything."
            ),
        }
    }
}

impl fmt::Display for ReviewTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pr_rejects_zero() {
        assert!(ReviewTarget::pr(0).is_none());
        assert_eq!(
            ReviewTarget::pr(17).map(|t| t.short_label()),
            Some("PR #17".to_string())
        );
    }

    #[test]
    fn worktree_scope_mentions_status_and_diff() {
        let scope = ReviewTarget::Worktree.scope_description();
        assert!(scope.contains("git status --short"));
        assert!(scope.contains("git diff HEAD"));
    }

    #[test]
    fn staged_scope_uses_cached_diff() {
        let scope = ReviewTarget::Staged.scope_description();
        assert!(scope.contains("git diff --cached"));
        assert!(!scope.contains("git diff HEAD"));
    }

    #[test]
    fn pr_scope_references_number() {
        let scope = ReviewTarget::pr(42).unwrap().scope_description();
        assert!(scope.contains("gh pr diff 42"));
        assert!(scope.contains("pull request #42"));
    }

    #[test]
    fn recent_scope_uses_range() {
        let scope = ReviewTarget::recent("abc123").scope_description();
        assert!(scope.contains("git log --oneline abc123..HEAD"));
        assert!(scope.contains("git diff abc123..HEAD"));
    }

    #[test]
    fn only_pr_skips_repository() {
        assert!(ReviewTarget::Worktree.needs_repository());
        assert!(ReviewTarget::recent("main").needs_repository());
        assert!(!ReviewTarget::pr(1).unwrap().needs_repository());
    }
}
