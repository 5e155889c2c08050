//! Sync pointer stored in the body of the sentinel issue.
//!
//! Body layout:
//!
//! ```text
//! https://github.com/<owner>/<repo>/pull/<number>
//!
//! https://github.com/<owner>/<repo>/tree/<merge sha>
//! ```
//!
//! Only the first line is required when parsing. Its last `/` or `#`
//! separated segment is the pull-request number.

use serde::Serialize;

use super::repository::RepoRef;
use crate::domain::errors::{DomainError, DomainResult};

/// Last processed upstream pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncPointer {
    pub number: u64,
    pub revision: Option<String>,
}

impl SyncPointer {
    pub const fn new(number: u64, revision: Option<String>) -> Self {
        Self { number, revision }
    }

    pub fn parse(body: &str) -> DomainResult<Self> {
        let body = body.replace("\r\n", "\n");
        let first = body.lines().next().map(str::trim).unwrap_or_default();
        if first.is_empty() {
            return Err(DomainError::Decode {
                what: "sync pointer".into(),
                reason: "pointer issue body is empty".into(),
            });
        }

        let tail = first
            .trim_end_matches('/')
            .rsplit(['/', '#'])
            .next()
            .unwrap_or(first);
        let number = tail.parse::<u64>().map_err(|_| DomainError::Decode {
            what: "sync pointer".into(),
            reason: format!("first line `{first}` does not end with a pull request number"),
        })?;

        let revision = body
            .lines()
            .skip(1)
            .filter_map(|line| line.trim().split_once("/tree/"))
            .map(|(_, rev)| rev.trim_end_matches('/').to_string())
            .find(|rev| !rev.is_empty());

        Ok(Self { number, revision })
    }

    pub fn render(&self, source: &RepoRef) -> String {
        let mut body = source.pull_url(self.number);
        if let Some(revision) = &self.revision {
            body.push_str("\n\n");
            body.push_str(&source.tree_url(revision));
        }
        body
    }
}
