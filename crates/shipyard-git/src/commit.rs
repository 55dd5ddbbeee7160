//! Commits as read from history.

use chrono::{DateTime, Utc};

/// A commit since the last release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full object id.
    pub hash: String,

    /// Full commit message.
    pub message: String,

    /// Author name.
    pub author: String,

    /// Commit time.
    pub date: DateTime<Utc>,
}

impl Commit {
    /// Returns the first line of the message.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim_end()
    }

    /// Returns the first seven characters of the hash.
    #[must_use]
    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, message: &str) -> Commit {
        Commit {
            hash: hash.to_string(),
            message: message.to_string(),
            author: "Jane".to_string(),
            date: Utc::now(),
        }
    }

    #[test]
    fn test_subject_first_line() {
        let c = commit("abc", "fix: trim input\n\nLonger explanation.");
        assert_eq!(c.subject(), "fix: trim input");
    }

    #[test]
    fn test_subject_empty_message() {
        assert_eq!(commit("abc", "").subject(), "");
    }

    #[test]
    fn test_short_hash() {
        let c = commit("0123456789abcdef", "x");
        assert_eq!(c.short_hash(), "0123456");
    }

    #[test]
    fn test_short_hash_short_input() {
        assert_eq!(commit("abc", "x").short_hash(), "abc");
    }
}
