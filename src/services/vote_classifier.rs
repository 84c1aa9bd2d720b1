//! Vote word classification for approval comments.
//!
//! A comment counts as a vote only when its whole body is one of the fixed
//! vote words. When deployment names are configured, an approval may carry
//! a bracketed target list (`approve[blue,green]`) which is split off
//! before the word is classified.

use crate::error::ApprovalError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Words that approve the workflow run.
pub const APPROVED_WORDS: &[&str] = &["approved", "approve", "lgtm", "yes"];

/// Words that deny the workflow run.
pub const DENIED_WORDS: &[&str] = &["denied", "deny", "no"];

/// Any approval word, then any run of `.`/`!`, then any run of newlines.
static APPROVAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^(?:{})[.!]*\n*$", alternation(APPROVED_WORDS)))
        .expect("approval pattern is valid")
});

/// Any denial word, then at most one `.` or `!`.
static DENIAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^(?:{})[.!]?$", alternation(DENIED_WORDS)))
        .expect("denial pattern is valid")
});

/// The bracketed part of a targeted vote, starting at the first `[`.
static DEPLOYMENT_LIST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(.*)\]\n*$").expect("deployment list pattern is valid"));

fn alternation(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

/// A recognised vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Approve,
    Deny,
}

/// Check if the whole body is an approval word.
///
/// Case-insensitive. Trailing `.`/`!` characters and trailing newlines are
/// accepted; any other surrounding text, including spaces, is not.
pub fn is_approval_word(body: &str) -> bool {
    APPROVAL_PATTERN.is_match(body)
}

/// Check if the whole body is a denial word.
///
/// Case-insensitive, with at most one trailing `.` or `!` and no trailing
/// newline.
pub fn is_denial_word(body: &str) -> bool {
    DENIAL_PATTERN.is_match(body)
}

/// Classify a comment body as a vote, if it is one.
///
/// Denial is checked first; the two vocabularies never overlap.
pub fn classify(body: &str) -> Option<Vote> {
    if is_denial_word(body) {
        Some(Vote::Deny)
    } else if is_approval_word(body) {
        Some(Vote::Approve)
    } else {
        None
    }
}

/// Split a targeted vote into its vote word and deployment names.
///
/// When `allowed_names` is empty or the body has no `[`, the body is
/// returned unchanged with no names. Otherwise the text before the first
/// `[` is returned as the vote word and the rest must be a single
/// bracketed, comma-separated list of allowed names.
///
/// # Errors
/// * `MalformedDeploymentSyntax` if the bracketed part does not parse
/// * `UnknownDeploymentName` if an entry, exactly as written, is not in
///   `allowed_names`
pub fn extract_deployment_names<'a>(
    body: &'a str,
    allowed_names: &[String],
) -> Result<(&'a str, Vec<String>), ApprovalError> {
    if allowed_names.is_empty() {
        return Ok((body, Vec::new()));
    }
    let Some(open) = body.find('[') else {
        return Ok((body, Vec::new()));
    };

    let (vote, list) = body.split_at(open);
    let inner = DEPLOYMENT_LIST_PATTERN
        .captures(list)
        .and_then(|c| c.get(1))
        .ok_or_else(|| ApprovalError::malformed(body))?
        .as_str();

    let allowed: HashSet<&str> = allowed_names.iter().map(String::as_str).collect();
    let mut names = Vec::new();
    for name in inner.split(',') {
        if !allowed.contains(name) {
            return Err(ApprovalError::unknown_name(name, allowed_names));
        }
        names.push(name.to_string());
    }

    Ok((vote, names))
}

/// Render vote words for the issue body, e.g. `"approved", "lgtm"`.
///
/// With more than one deployment name configured, every word is suffixed
/// with the full target list so reviewers see the targeted syntax.
pub fn format_accepted_words(words: &[&str], deployment_names: &[String]) -> String {
    let suffix = if deployment_names.len() > 1 {
        format!("[{}]", deployment_names.join(","))
    } else {
        String::new()
    };

    words
        .iter()
        .map(|word| format!("\"{}{}\"", word, suffix))
        .collect::<Vec<_>>()
        .join(", ")
}
