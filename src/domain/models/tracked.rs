//! Tracked-file list stored in the body of a tracking issue.

use std::collections::BTreeSet;

use super::repository::{SourceRepo, TranslateRepo};

/// Sorted, deduplicated set of upstream paths tracked by one issue.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackedFiles(BTreeSet<String>);

impl TrackedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the path was not tracked yet.
    pub fn insert(&mut self, path: &str) -> bool {
        self.0.insert(path.to_string())
    }

    /// Returns `true` if the path was tracked.
    pub fn remove(&mut self, path: &str) -> bool {
        self.0.remove(path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TrackedFiles {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

const SOURCE_HEADING: &str = "## Source";
const TRANSLATE_HEADING: &str = "## Translate";

/// Renders and parses tracking issue bodies.
///
/// The body has a `## Source` section linking each file in the source tree
/// and an optional `## Translate` section with the mirrored target paths.
/// Only the source list is read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyLayout {
    pub source: SourceRepo,
    pub translate: Option<TranslateRepo>,
}

impl BodyLayout {
    pub const fn new(source: SourceRepo, translate: Option<TranslateRepo>) -> Self {
        Self { source, translate }
    }

    fn source_prefix(&self) -> String {
        format!("{}/", self.source.repo.tree_url(&self.source.branch))
    }

    pub fn parse(&self, body: &str) -> TrackedFiles {
        let prefix = self.source_prefix();
        // Bodies written by hand may hold a bare list with no headings.
        let mut in_source = true;
        let mut files = TrackedFiles::new();

        for line in body.lines().map(str::trim) {
            if line.starts_with("## ") {
                in_source = line == SOURCE_HEADING;
                continue;
            }
            if !in_source {
                continue;
            }
            let Some(item) = line.strip_prefix("- ").map(str::trim) else {
                continue;
            };
            if let Some(path) = item.strip_prefix(&prefix) {
                files.insert(path);
            } else if let Some((_, rest)) = item.split_once("/tree/") {
                // Link from an older branch name: drop the ref segment.
                if let Some((_, path)) = rest.split_once('/') {
                    files.insert(path);
                }
            } else if !item.is_empty() && !item.contains("://") {
                files.insert(item);
            }
        }
        files
    }

    pub fn render(&self, files: &TrackedFiles) -> String {
        let mut body = String::new();
        body.push_str(SOURCE_HEADING);
        body.push_str("\n\n");
        let first = files.iter().next();
        if let (Some(site), Some(first)) = (&self.source.site, first) {
            body.push_str(&format!(
                "#### URL\n\n{}\n\n",
                page_url(site, first, self.source.remove_prefix.as_deref())
            ));
        }
        body.push_str("#### Files\n\n");
        for path in files.iter() {
            body.push_str(&format!("- {}{path}\n", self.source_prefix()));
        }

        if let Some(translate) = &self.translate {
            body.push('\n');
            body.push_str(TRANSLATE_HEADING);
            body.push_str("\n\n");
            let mirror = |p: &str| p.replacen(&translate.replace_from, &translate.replace_to, 1);
            if let (Some(site), Some(first)) = (&translate.site, first) {
                body.push_str(&format!(
                    "#### URL\n\n{}\n\n",
                    page_url(site, &mirror(first), Some(&translate.replace_to))
                ));
            }
            body.push_str("#### Files\n\n");
            let tree = translate.repo.tree_url(&translate.branch);
            for path in files.iter() {
                body.push_str(&format!("- {tree}/{}\n", mirror(path)));
            }
        }
        body
    }
}

/// Site URL of the directory page a file is rendered into.
fn page_url(site: &str, path: &str, remove_prefix: Option<&str>) -> String {
    let relative = remove_prefix
        .and_then(|prefix| path.strip_prefix(prefix))
        .unwrap_or(path);
    let dir = relative
        .rsplit_once('/')
        .map_or("", |(dir, _)| dir)
        .trim_matches('/');
    let site = site.trim_end_matches('/');
    if dir.is_empty() {
        format!("{site}/")
    } else {
        format!("{site}/{dir}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::repository::RepoRef;

    fn layout() -> BodyLayout {
        BodyLayout::new(
            SourceRepo {
                repo: RepoRef::new("org", "website"),
                branch: "master".into(),
                site: Some("https://example.io".into()),
                remove_prefix: Some("content/en/".into()),
            },
            Some(TranslateRepo {
                repo: RepoRef::new("org", "website"),
                branch: "master".into(),
                site: Some("https://example.io/zh".into()),
                replace_from: "content/en/".into(),
                replace_to: "content/zh/".into(),
            }),
        )
    }

    #[test]
    fn test_render_is_sorted_and_parse_reads_source_only() {
        let layout = layout();
        let files: TrackedFiles = ["content/en/docs/b.md", "content/en/docs/a.md"]
            .into_iter()
            .collect();
        let body = layout.render(&files);

        let a = body.find("content/en/docs/a.md").unwrap();
        let b = body.find("content/en/docs/b.md").unwrap();
        assert!(a < b);
        assert!(body.contains("#### URL\n\nhttps://example.io/docs/"));
        assert!(body.contains("https://github.com/org/website/tree/master/content/zh/docs/a.md"));

        let parsed = layout.parse(&body);
        assert_eq!(parsed, files);
    }

    #[test]
    fn test_parse_bare_list_and_foreign_branch_links() {
        let layout = layout();
        let body = "- docs/a.md\n- https://github.com/org/website/tree/main/docs/b.md\r\n- \n";
        let parsed = layout.parse(body);
        assert_eq!(parsed.iter().collect::<Vec<_>>(), vec!["docs/a.md", "docs/b.md"]);
    }

    #[test]
    fn test_empty_list_renders_without_url() {
        let layout = layout();
        let body = layout.render(&TrackedFiles::new());
        assert!(!body.contains("#### URL"));
        assert!(layout.parse(&body).is_empty());
    }

    #[test]
    fn test_insert_is_a_set_operation() {
        let mut files = TrackedFiles::new();
        assert!(files.insert("docs/a.md"));
        assert!(!files.insert("docs/a.md"));
        assert_eq!(files.len(), 1);
        assert!(files.remove("docs/a.md"));
        assert!(!files.remove("docs/a.md"));
    }
}
