//! Turning command arguments (or a menu choice) into a [`ReviewTarget`].
//!
//! Accepted forms:
//! - `worktree`, `wt`, `working`, `changes`: uncommitted changes
//! - `staged`, `cached`, `index`: staged changes
//! - `pr 42`, `pr#42`, `#42`: a pull request
//! - `recent main`, `since v1.2`, `main..HEAD`: commits since a base
//!
//! No arguments means the user should pick from a menu.

use crate::errors::SuiteError;
use crate::repo::RepoInspector;
use crate::target::ReviewTarget;
use anyhow::Result;
use dialoguer::{Input, Select, theme::ColorfulTheme};
use regex::Regex;
use std::sync::LazyLock;

static PR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)(?:pr\s*#?\s*|#)(\d+)$").unwrap());

static RECENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)(?:recent|since)\s+(\S+)$").unwrap());

static RANGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+?)\.\.HEAD$").unwrap());

/// Commits offered by the interactive base picker.
const PICKER_COMMITS: usize = 15;

/// Outcome of parsing target arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Target(ReviewTarget),
    /// No arguments were given.
    NeedsSelection,
}

/// Parse the argument text of a review command.
pub fn parse_target_args(args: &str) -> Result<Resolution, SuiteError> {
    let input = args.split_whitespace().collect::<Vec<_>>().join(" ");
    if input.is_empty() {
        return Ok(Resolution::NeedsSelection);
    }

    let target = match input.to_ascii_lowercase().as_str() {
        "worktree" | "wt" | "working" | "changes" => ReviewTarget::Worktree,
        "staged" | "cached" | "index" => ReviewTarget::Staged,
        "pr" => return Err(SuiteError::invalid_target(&input, "missing PR number")),
        "recent" | "since" => return Err(SuiteError::invalid_target(&input, "missing base ref")),
        _ => parse_compound(&input)?,
    };
    Ok(Resolution::Target(target))
}

fn parse_compound(input: &str) -> Result<ReviewTarget, SuiteError> {
    if let Some(caps) = PR_REGEX.captures(input) {
        return caps[1]
            .parse::<u32>()
            .ok()
            .and_then(ReviewTarget::pr)
            .ok_or_else(|| {
                SuiteError::invalid_target(input, "PR number must be a positive integer")
            });
    }
    if let Some(caps) = RECENT_REGEX.captures(input) {
        return Ok(ReviewTarget::recent(&caps[1]));
    }
    if let Some(caps) = RANGE_REGEX.captures(input) {
        return Ok(ReviewTarget::recent(&caps[1]));
    }
    Err(SuiteError::invalid_target(
        input,
        "expected worktree, staged, pr <n>, or recent <ref>",
    ))
}

/// Ask the user what to review. `Ok(None)` means they cancelled.
///
/// Without a repository only pull requests can be picked.
pub fn pick_target(repo: Option<&RepoInspector>) -> Result<Option<ReviewTarget>> {
    let theme = ColorfulTheme::default();

    let mut options: Vec<(String, Choice)> = Vec::new();
    if let Some(repo) = repo {
        let counts = repo.change_counts().unwrap_or_default();
        options.push((
            format!("Uncommitted changes ({} changed)", counts.unstaged + counts.staged),
            Choice::Worktree,
        ));
        options.push((
            format!("Staged changes ({} staged)", counts.staged),
            Choice::Staged,
        ));
    }
    options.push(("A pull request".to_string(), Choice::Pr));
    if repo.is_some() {
        options.push(("Commits since a base commit".to_string(), Choice::Recent));
    }

    let labels: Vec<&str> = options.iter().map(|(label, _)| label.as_str()).collect();
    let Some(selection) = Select::with_theme(&theme)
        .with_prompt("What should the review suite look at?")
        .items(&labels)
        .default(0)
        .interact_opt()?
    else {
        return Ok(None);
    };

    match options[selection].1 {
        Choice::Worktree => Ok(Some(ReviewTarget::Worktree)),
        Choice::Staged => Ok(Some(ReviewTarget::Staged)),
        Choice::Pr => {
            let number: String = Input::with_theme(&theme)
                .with_prompt("PR number")
                .validate_with(|input: &String| -> Result<(), &str> {
                    match input.trim().parse::<u32>() {
                        Ok(n) if n > 0 => Ok(()),
                        _ => Err("enter a positive integer"),
                    }
                })
                .interact_text()?;
            Ok(number.trim().parse::<u32>().ok().and_then(ReviewTarget::pr))
        }
        Choice::Recent => match repo {
            Some(repo) => pick_base(&theme, repo),
            None => Ok(None),
        },
    }
}

#[derive(Debug, Clone, Copy)]
enum Choice {
    Worktree,
    Staged,
    Pr,
    Recent,
}

fn pick_base(theme: &ColorfulTheme, repo: &RepoInspector) -> Result<Option<ReviewTarget>> {
    let commits = repo.recent_commits(PICKER_COMMITS)?;
    if commits.is_empty() {
        anyhow::bail!(SuiteError::NoReviewContext {
            reason: "the repository has no commits".to_string(),
        });
    }

    let labels: Vec<String> = commits.iter().map(|c| c.label()).collect();
    let Some(selection) = Select::with_theme(theme)
        .with_prompt("Review commits made after")
        .items(&labels)
        .default(labels.len().min(5) - 1)
        .interact_opt()?
    else {
        return Ok(None);
    };

    Ok(Some(ReviewTarget::recent(&commits[selection].short_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(args: &str) -> ReviewTarget {
        match parse_target_args(args).unwrap() {
            Resolution::Target(t) => t,
            Resolution::NeedsSelection => panic!("expected a target for {args:?}"),
        }
    }

    #[test]
    fn empty_needs_selection() {
        assert_eq!(parse_target_args("").unwrap(), Resolution::NeedsSelection);
        assert_eq!(parse_target_args("   ").unwrap(), Resolution::NeedsSelection);
    }

    #[test]
    fn worktree_and_staged_aliases() {
        for alias in ["worktree", "wt", "working", "changes", "WT"] {
            assert_eq!(target(alias), ReviewTarget::Worktree, "{alias}");
        }
        for alias in ["staged", "cached", "index"] {
            assert_eq!(target(alias), ReviewTarget::Staged, "{alias}");
        }
    }

    #[test]
    fn pr_forms() {
        let expected = ReviewTarget::pr(42).unwrap();
        for form in ["pr 42", "pr#42", "PR #42", "#42", "pr42"] {
            assert_eq!(target(form), expected, "{form}");
        }
    }

    #[test]
    fn pr_zero_and_overflow_rejected() {
        for form in ["pr 0", "#0", "pr 99999999999"] {
            let err = parse_target_args(form).unwrap_err();
            assert!(
                matches!(err, SuiteError::InvalidTarget { ref reason, .. } if reason.contains("positive")),
                "{form}"
            );
        }
    }

    #[test]
    fn recent_forms() {
        assert_eq!(target("recent main"), ReviewTarget::recent("main"));
        assert_eq!(target("since v1.2.0"), ReviewTarget::recent("v1.2.0"));
        assert_eq!(target("origin/main..HEAD"), ReviewTarget::recent("origin/main"));
    }

    #[test]
    fn missing_operands_rejected() {
        assert!(matches!(
            parse_target_args("pr"),
            Err(SuiteError::InvalidTarget { ref reason, .. }) if reason.contains("PR number")
        ));
        assert!(matches!(
            parse_target_args("recent"),
            Err(SuiteError::InvalidTarget { ref reason, .. }) if reason.contains("base ref")
        ));
    }

    #[test]
    fn unknown_input_rejected() {
        let err = parse_target_args("everything please").unwrap_err();
        assert!(matches!(err, SuiteError::InvalidTarget { ref input, .. } if input == "everything please"));
    }
}
