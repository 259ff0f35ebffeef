//! Porcelain v1 status parsing.
//!
//! Parses the output of `git status --porcelain=v1 --branch -z` into a
//! structured [`RawStatus`]. The `-z` form is used so that pathnames arrive
//! unquoted, NUL-separated, with rename records as a target/origin token
//! pair.

use std::path::PathBuf;

use crate::{Error, Result};

/// One status entry as git reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatusEntry {
    /// Path relative to the repository root
    pub path: PathBuf,

    /// Index (staging area) status code, `' '` when unchanged
    pub index: char,

    /// Working-directory status code, `' '` when unchanged
    pub workdir: char,

    /// Origin path for rename/copy entries
    pub renamed_from: Option<PathBuf>,
}

/// Structured result of a porcelain status query.
///
/// Category membership follows porcelain semantics: a single path can appear
/// in more than one list (an `AM` entry is both created/staged and
/// modified). Conflicted and untracked entries are exclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStatus {
    /// Current branch name; `None` only when the header is missing
    pub current: Option<String>,

    /// Upstream tracking branch, if one is configured
    pub tracking: Option<String>,

    /// Commits ahead of the tracking branch
    pub ahead: usize,

    /// Commits behind the tracking branch
    pub behind: usize,

    /// HEAD points at a commit rather than a branch
    pub detached: bool,

    /// Paths with index-side changes (`A`/`M`/`D`/`R`/`C` in column X)
    pub staged: Vec<PathBuf>,

    /// Untracked paths (`??`)
    pub not_added: Vec<PathBuf>,

    /// Paths newly added to the index (`A` in column X)
    pub created: Vec<PathBuf>,

    /// Paths with content changes on either side (`M`, or renames/copies)
    pub modified: Vec<PathBuf>,

    /// Paths deleted on either side (`D`)
    pub deleted: Vec<PathBuf>,

    /// Unmerged paths (`U` on either side, `AA`, `DD`)
    pub conflicted: Vec<PathBuf>,

    /// Every entry with its raw status codes
    pub entries: Vec<RawStatusEntry>,
}

/// Parse `git status --porcelain=v1 --branch -z` output.
pub fn parse_porcelain(output: &str) -> Result<RawStatus> {
    let mut status = RawStatus::default();

    let tokens: Vec<&str> = output.split('\0').filter(|t| !t.is_empty()).collect();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        i += 1;

        if let Some(header) = token.strip_prefix("## ") {
            parse_branch_header(header.trim_end(), &mut status);
            continue;
        }

        // Entry tokens are "XY <path>", two code columns and a separator.
        if token.len() < 4 || token.as_bytes()[2] != b' ' {
            return Err(Error::Parse {
                message: format!("malformed status entry: {token:?}"),
            });
        }
        let index = token.as_bytes()[0] as char;
        let workdir = token.as_bytes()[1] as char;
        let path = PathBuf::from(&token[3..]);

        // Renames/copies carry the origin path as the following token.
        let renamed_from = if is_rename(index) || is_rename(workdir) {
            let origin = tokens.get(i).ok_or_else(|| Error::Parse {
                message: format!("rename entry without origin path: {token:?}"),
            })?;
            i += 1;
            Some(PathBuf::from(*origin))
        } else {
            None
        };

        classify(&mut status, &path, index, workdir);
        status.entries.push(RawStatusEntry {
            path,
            index,
            workdir,
            renamed_from,
        });
    }

    Ok(status)
}

fn is_rename(code: char) -> bool {
    matches!(code, 'R' | 'C')
}

fn classify(status: &mut RawStatus, path: &PathBuf, index: char, workdir: char) {
    if index == '?' || workdir == '?' {
        status.not_added.push(path.clone());
        return;
    }

    let conflicted = index == 'U'
        || workdir == 'U'
        || (index == 'A' && workdir == 'A')
        || (index == 'D' && workdir == 'D');
    if conflicted {
        status.conflicted.push(path.clone());
        return;
    }

    if matches!(index, 'A' | 'M' | 'D' | 'R' | 'C') {
        status.staged.push(path.clone());
    }
    if index == 'A' {
        status.created.push(path.clone());
    }
    if index == 'D' || workdir == 'D' {
        status.deleted.push(path.clone());
    }
    if index == 'M' || workdir == 'M' || is_rename(index) {
        status.modified.push(path.clone());
    }
}

/// Parse the `--branch` header line (without the leading `## `).
fn parse_branch_header(header: &str, status: &mut RawStatus) {
    if header == "HEAD (no branch)" {
        status.detached = true;
        status.current = Some("HEAD".to_string());
        return;
    }

    // Unborn HEAD; newer and older git spellings.
    for prefix in ["No commits yet on ", "Initial commit on "] {
        if let Some(branch) = header.strip_prefix(prefix) {
            status.current = Some(branch.to_string());
            return;
        }
    }

    let (names, counts) = match header.split_once(" [") {
        Some((names, rest)) => (names, Some(rest.trim_end_matches(']'))),
        None => (header, None),
    };

    match names.split_once("...") {
        Some((current, tracking)) => {
            status.current = Some(current.to_string());
            status.tracking = Some(tracking.to_string());
        }
        None => status.current = Some(names.to_string()),
    }

    if let Some(counts) = counts {
        for part in counts.split(", ") {
            if let Some(n) = part.strip_prefix("ahead ") {
                status.ahead = n.parse().unwrap_or(0);
            } else if let Some(n) = part.strip_prefix("behind ") {
                status.behind = n.parse().unwrap_or(0);
            }
            // "[gone]" means the upstream vanished; counts stay zero.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(tokens: &[&str]) -> RawStatus {
        parse_porcelain(&tokens.join("\0")).unwrap()
    }

    #[test]
    fn branch_header_with_tracking_and_counts() {
        let status = parse(&["## main...origin/main [ahead 2, behind 1]"]);
        assert_eq!(status.current.as_deref(), Some("main"));
        assert_eq!(status.tracking.as_deref(), Some("origin/main"));
        assert_eq!(status.ahead, 2);
        assert_eq!(status.behind, 1);
        assert!(!status.detached);
    }

    #[rstest]
    #[case("## main...origin/main [ahead 3]", 3, 0)]
    #[case("## main...origin/main [behind 4]", 0, 4)]
    #[case("## main...origin/main [gone]", 0, 0)]
    #[case("## main...origin/main", 0, 0)]
    fn branch_header_count_variants(
        #[case] header: &str,
        #[case] ahead: usize,
        #[case] behind: usize,
    ) {
        let status = parse(&[header]);
        assert_eq!(status.ahead, ahead);
        assert_eq!(status.behind, behind);
        assert_eq!(status.tracking.as_deref(), Some("origin/main"));
    }

    #[test]
    fn branch_header_without_upstream() {
        let status = parse(&["## feature/retry"]);
        assert_eq!(status.current.as_deref(), Some("feature/retry"));
        assert_eq!(status.tracking, None);
    }

    #[test]
    fn branch_header_detached() {
        let status = parse(&["## HEAD (no branch)"]);
        assert!(status.detached);
        assert_eq!(status.current.as_deref(), Some("HEAD"));
    }

    #[rstest]
    #[case("## No commits yet on main")]
    #[case("## Initial commit on main")]
    fn branch_header_unborn(#[case] header: &str) {
        let status = parse(&[header]);
        assert_eq!(status.current.as_deref(), Some("main"));
        assert!(!status.detached);
    }

    #[test]
    fn untracked_entry() {
        let status = parse(&["## main", "?? notes/draft.md"]);
        assert_eq!(status.not_added, vec![PathBuf::from("notes/draft.md")]);
        assert!(status.staged.is_empty());
        assert_eq!(status.entries.len(), 1);
        assert_eq!(status.entries[0].index, '?');
        assert_eq!(status.entries[0].workdir, '?');
    }

    #[test]
    fn staged_new_file_with_later_edits() {
        // "AM": added to the index, then modified again in the worktree.
        let status = parse(&["## main", "AM a.txt"]);
        let a = PathBuf::from("a.txt");
        assert_eq!(status.staged, vec![a.clone()]);
        assert_eq!(status.created, vec![a.clone()]);
        assert_eq!(status.modified, vec![a]);
        assert!(status.deleted.is_empty());
    }

    #[test]
    fn worktree_deletion() {
        let status = parse(&["## main", " D gone.rs"]);
        assert_eq!(status.deleted, vec![PathBuf::from("gone.rs")]);
        assert!(status.staged.is_empty());
    }

    #[test]
    fn staged_deletion() {
        let status = parse(&["## main", "D  gone.rs"]);
        assert_eq!(status.deleted, vec![PathBuf::from("gone.rs")]);
        assert_eq!(status.staged, vec![PathBuf::from("gone.rs")]);
    }

    #[test]
    fn rename_consumes_origin_token() {
        let status = parse(&["## main", "R  new_name.rs", "old_name.rs", "?? extra.txt"]);
        assert_eq!(status.staged, vec![PathBuf::from("new_name.rs")]);
        assert_eq!(status.modified, vec![PathBuf::from("new_name.rs")]);
        assert_eq!(
            status.entries[0].renamed_from.as_deref(),
            Some(std::path::Path::new("old_name.rs"))
        );
        // The token after the origin is parsed as its own entry.
        assert_eq!(status.not_added, vec![PathBuf::from("extra.txt")]);
    }

    #[rstest]
    #[case("UU both.rs")]
    #[case("AA both.rs")]
    #[case("DD both.rs")]
    #[case("AU both.rs")]
    #[case("UD both.rs")]
    fn conflict_codes(#[case] entry: &str) {
        let status = parse(&["## main", entry]);
        assert_eq!(status.conflicted, vec![PathBuf::from("both.rs")]);
        assert!(status.staged.is_empty());
        assert!(status.deleted.is_empty());
    }

    #[test]
    fn rename_without_origin_is_a_parse_error() {
        let err = parse_porcelain("## main\0R  new_name.rs\0").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn malformed_entry_is_a_parse_error() {
        let err = parse_porcelain("##x\0").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn empty_output_is_an_empty_status() {
        let status = parse_porcelain("").unwrap();
        assert_eq!(status, RawStatus::default());
    }

    #[test]
    fn paths_with_spaces_survive_nul_separation() {
        let status = parse(&["## main", "?? my notes.txt"]);
        assert_eq!(status.not_added, vec![PathBuf::from("my notes.txt")]);
    }
}
