//! Comment model for the approval thread.

use serde::{Deserialize, Serialize};

/// A comment on the approval issue, as seen by the approval engine.
///
/// Comments are only meaningful in the order the issue tracker returns
/// them (oldest first). Nothing else about a comment is modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment author's login.
    pub author: String,

    /// Comment content (Markdown, unmodified).
    pub body: String,
}

impl Comment {
    /// Create a comment from an author login and body.
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
        }
    }

    /// Check if this comment was written by `login`.
    pub fn is_by(&self, login: &str) -> bool {
        self.author == login
    }
}
