//! Commit log parsing.
//!
//! The driver asks git for a custom `--pretty=format:` record per commit,
//! using the ASCII unit/record separators so that commit messages containing
//! newlines or punctuation never break field splitting.

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Field separator within one commit record (ASCII unit separator).
pub const FIELD_SEP: char = '\u{1f}';

/// Separator between commit records (ASCII record separator).
pub const RECORD_SEP: char = '\u{1e}';

/// One commit as git reported it, most-recent-first ordering preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLogEntry {
    /// Full commit hash
    pub hash: String,

    /// Author date
    pub date: DateTime<Utc>,

    /// Commit subject line
    pub message: String,

    /// Decoration refs (`HEAD -> main, origin/main`), empty when none
    pub refs: String,

    /// Author name
    pub author_name: String,

    /// Author email
    pub author_email: String,
}

/// Parsed commit log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLog {
    pub entries: Vec<RawLogEntry>,
}

/// The `--pretty=format:` argument matching [`parse_log`].
pub fn format_arg() -> String {
    format!(
        "--pretty=format:%H{f}%aI{f}%s{f}%D{f}%aN{f}%aE{r}",
        f = FIELD_SEP,
        r = RECORD_SEP
    )
}

/// Parse log output produced with [`format_arg`].
pub fn parse_log(output: &str) -> Result<RawLog> {
    let mut log = RawLog::default();

    for record in output.split(RECORD_SEP) {
        let record = record.trim_matches(['\n', '\r']);
        if record.is_empty() {
            continue;
        }

        let fields: Vec<&str> = record.split(FIELD_SEP).collect();
        let [hash, date, message, refs, author_name, author_email] = fields[..] else {
            return Err(Error::Parse {
                message: format!("log record with {} fields: {record:?}", fields.len()),
            });
        };

        let date = DateTime::parse_from_rfc3339(date)
            .map_err(|e| Error::Parse {
                message: format!("bad commit date {date:?}: {e}"),
            })?
            .with_timezone(&Utc);

        log.entries.push(RawLogEntry {
            hash: hash.to_string(),
            date,
            message: message.to_string(),
            refs: refs.to_string(),
            author_name: author_name.to_string(),
            author_email: author_email.to_string(),
        });
    }

    Ok(log)
}
