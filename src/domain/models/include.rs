//! Include rules: which upstream files are tracked, and under which title.

use serde::Serialize;

/// A path predicate mapping upstream files to a title and creation labels.
///
/// `path` is a prefix unless it starts with `*`, in which case the remainder
/// must appear anywhere in the file path. Exclusions nest, so an exclusion's
/// own exclusions bring files back in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IncludeRule {
    pub path: String,
    /// Fixed title overriding the grouping policy.
    pub title: Option<String>,
    pub labels: Vec<String>,
    /// Allowed file endings. Empty accepts every file.
    pub suffixes: Vec<String>,
    pub excludes: Vec<IncludeRule>,
}

impl IncludeRule {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn matches(&self, file: &str) -> bool {
        self.path_matches(file) && !self.excludes.iter().any(|e| e.matches(file))
    }

    fn path_matches(&self, file: &str) -> bool {
        let hit = match self.path.strip_prefix('*') {
            Some(needle) => file.contains(needle),
            None => file.starts_with(&self.path),
        };
        hit && (self.suffixes.is_empty() || self.suffixes.iter().any(|s| file.ends_with(s)))
    }
}

/// How computed titles group files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    /// One issue per directory.
    #[default]
    Directory,
    /// One issue per file.
    File,
}

/// Title computation for files whose include rule has no fixed title.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TitlePolicy {
    pub grouping: Grouping,
    /// Leading path segments dropped before building the title.
    pub skip: usize,
    /// Title shared by every `_index.*` file.
    pub index_title: Option<String>,
}

impl TitlePolicy {
    pub fn title_for(&self, path: &str) -> String {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        if let Some(index_title) = &self.index_title {
            let stem = file_name.split('.').next().unwrap_or(file_name);
            if stem == "_index" {
                return index_title.clone();
            }
        }

        let segments: Vec<&str> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .skip(self.skip)
            .collect();

        match (self.grouping, segments.split_last()) {
            (Grouping::Directory, Some((_, dirs))) if !dirs.is_empty() => dirs.join("/"),
            (Grouping::File, Some(_)) => segments.join("/"),
            _ => file_name.to_string(),
        }
    }
}

/// Where a file landed after include matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub title: String,
    pub labels: Vec<String>,
}

/// Ordered include rules plus the title policy. First match wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IncludeSet {
    pub rules: Vec<IncludeRule>,
    pub policy: TitlePolicy,
}

impl IncludeSet {
    pub fn resolve(&self, path: &str) -> Option<Resolution> {
        let rule = self.rules.iter().find(|r| r.matches(path))?;
        Some(Resolution {
            title: rule
                .title
                .clone()
                .unwrap_or_else(|| self.policy.title_for(path)),
            labels: rule.labels.clone(),
        })
    }
}
