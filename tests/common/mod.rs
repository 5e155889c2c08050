//! Common test utilities for integration tests
//!
//! In-memory implementations of the three ports plus a rule set shared by the
//! scenario tests. The fakes record every write so tests can assert on them.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use issue_shepherd::domain::errors::{DomainError, DomainResult};
use issue_shepherd::domain::models::{
    ChangeKind, ChangedFile, EventContext, IssueDraft, IssueEdit, IssueQuery, IssueSnapshot,
    IssueState, MergedChange,
};
use issue_shepherd::{
    IssueTracker, MembershipDirectory, Ports, RuleBook, RuleLoader, Shepherd, Tuning,
    UpstreamSource,
};

/// Rule documents used across scenarios.
///
/// Issue #1 holds the sync pointer. Files under `content/en/` are tracked,
/// titled by their directory below `content/en/`.
pub const RULES: &str = r"
api_version: v1
kind: Repository
metadata:
  name: website
spec:
  workspace:
    owner: acme
    repository: website-issues
  source:
    owner: acme
    repository: website
    branch: main
  maintainer_team: docs-maintainers
  detection:
    pointer_issue: 1
    needs_review_labels: [status/needs-review]
---
kind: IssueCreate
metadata:
  name: pages
spec:
  labels: [tracking]
  title_skip: 2
  includes:
    - path: content/en/
      labels: [lang/en]
      suffixes: [.md]
---
kind: IssueComment
metadata:
  name: accept
spec:
  rules:
    instruct: /accept
    permissions: [member]
    labels: [status/available]
    permission_feedback: '@commenter only organization members can accept issues'
  action:
    add_labels: [status/pending]
    add_labels_limit: 2
    limit_feedback: '@commenter you already hold @count issues'
    remove_labels: [status/available]
    add_assignees: [commenter]
    success_feedback: 'assigned to @assignees'
---
kind: IssueComment
metadata:
  name: start
spec:
  rules:
    instruct: /start
    permissions: [assignees]
    labels: [status/pending]
  action:
    add_labels: [status/in-progress]
    remove_labels: [status/pending]
";

/// Parse [`RULES`].
pub fn rules() -> RuleBook {
    RuleLoader::load_str(RULES).expect("test rules must load")
}

/// Initialize tracing output captured by the test harness.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("issue_shepherd=debug")
        .try_init();
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// Fixed timestamp `2026-05-01T<hour>:00:00Z`.
pub fn at_hour(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap()
}

pub fn issue(number: u64, title: &str, labels: &[&str], assignees: &[&str]) -> IssueSnapshot {
    IssueSnapshot {
        number,
        title: title.to_string(),
        labels: strings(labels),
        assignees: strings(assignees),
        ..Default::default()
    }
}

/// Comment event from `actor` on `issue`.
pub fn comment_on(actor: &str, issue: IssueSnapshot) -> EventContext {
    EventContext::new("acme", "website-issues", actor, issue)
}

pub fn merged(number: u64, sha: &str, hour: u32) -> MergedChange {
    MergedChange {
        number,
        merge_sha: Some(sha.to_string()),
        merged_at: at_hour(hour),
    }
}

pub fn added(path: &str, pr: u64) -> ChangedFile {
    ChangedFile::new(path, ChangeKind::Added, pr)
}

fn failure(operation: &str, number: u64) -> DomainError {
    DomainError::RemoteStatus {
        operation: format!("{operation} #{number}"),
        status: 502,
        body: "bad gateway".to_string(),
    }
}

/// Issue store keyed by number.
#[derive(Default)]
pub struct FakeTracker {
    issues: Mutex<BTreeMap<u64, IssueSnapshot>>,
    edits: Mutex<Vec<(u64, IssueEdit)>>,
    comments: Mutex<Vec<(u64, String)>>,
    created: Mutex<Vec<IssueDraft>>,
    label_events: Mutex<HashMap<(u64, String), DateTime<Utc>>>,
    failing_edits: Mutex<HashSet<u64>>,
    failing_label_lookups: Mutex<HashSet<u64>>,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issues(issues: impl IntoIterator<Item = IssueSnapshot>) -> Self {
        let tracker = Self::new();
        for issue in issues {
            tracker.insert(issue);
        }
        tracker
    }

    pub fn insert(&self, issue: IssueSnapshot) {
        self.issues.lock().unwrap().insert(issue.number, issue);
    }

    /// Make every edit of `number` fail with a remote error.
    pub fn fail_edits_of(&self, number: u64) {
        self.failing_edits.lock().unwrap().insert(number);
    }

    /// Make label history lookups of `number` fail with a remote error.
    pub fn fail_label_lookups_of(&self, number: u64) {
        self.failing_label_lookups.lock().unwrap().insert(number);
    }

    pub fn record_label_event(&self, number: u64, label: &str, at: DateTime<Utc>) {
        self.label_events
            .lock()
            .unwrap()
            .insert((number, label.to_string()), at);
    }

    pub fn issue(&self, number: u64) -> Option<IssueSnapshot> {
        self.issues.lock().unwrap().get(&number).cloned()
    }

    pub fn issue_titled(&self, title: &str) -> Option<IssueSnapshot> {
        self.issues
            .lock()
            .unwrap()
            .values()
            .find(|i| i.title == title)
            .cloned()
    }

    pub fn edits(&self) -> Vec<(u64, IssueEdit)> {
        self.edits.lock().unwrap().clone()
    }

    pub fn comments(&self) -> Vec<(u64, String)> {
        self.comments.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<IssueDraft> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn get_issue(&self, number: u64) -> DomainResult<IssueSnapshot> {
        self.issue(number).ok_or(DomainError::IssueNotFound(number))
    }

    async fn list_issues(&self, query: &IssueQuery) -> DomainResult<Vec<IssueSnapshot>> {
        Ok(self
            .issues
            .lock()
            .unwrap()
            .values()
            .filter(|i| i.state == query.state)
            .filter(|i| i.has_labels(&query.labels))
            .filter(|i| query.assignee.as_deref().is_none_or(|login| i.is_assigned(login)))
            .cloned()
            .collect())
    }

    async fn create_issue(&self, draft: &IssueDraft) -> DomainResult<IssueSnapshot> {
        let mut issues = self.issues.lock().unwrap();
        let number = issues.keys().next_back().map_or(1, |n| n + 1);
        let issue = IssueSnapshot {
            number,
            title: draft.title.clone(),
            body: draft.body.clone(),
            labels: draft.labels.clone(),
            assignees: draft.assignees.clone(),
            milestone: draft.milestone,
            state: IssueState::Open,
            updated_at: None,
        };
        issues.insert(number, issue.clone());
        self.created.lock().unwrap().push(draft.clone());
        Ok(issue)
    }

    async fn edit_issue(&self, number: u64, edit: &IssueEdit) -> DomainResult<IssueSnapshot> {
        if self.failing_edits.lock().unwrap().contains(&number) {
            return Err(failure("edit issue", number));
        }
        let mut issues = self.issues.lock().unwrap();
        let issue = issues
            .get_mut(&number)
            .ok_or(DomainError::IssueNotFound(number))?;
        if let Some(title) = &edit.title {
            issue.title.clone_from(title);
        }
        if let Some(body) = &edit.body {
            issue.body.clone_from(body);
        }
        if let Some(labels) = &edit.labels {
            issue.labels.clone_from(labels);
        }
        if let Some(assignees) = &edit.assignees {
            issue.assignees.clone_from(assignees);
        }
        if let Some(state) = edit.state {
            issue.state = state;
        }
        self.edits.lock().unwrap().push((number, edit.clone()));
        Ok(issue.clone())
    }

    async fn post_comment(&self, number: u64, body: &str) -> DomainResult<()> {
        self.comments
            .lock()
            .unwrap()
            .push((number, body.to_string()));
        Ok(())
    }

    async fn label_applied_at(
        &self,
        number: u64,
        label: &str,
    ) -> DomainResult<Option<DateTime<Utc>>> {
        if self.failing_label_lookups.lock().unwrap().contains(&number) {
            return Err(failure("list events of issue", number));
        }
        Ok(self
            .label_events
            .lock()
            .unwrap()
            .get(&(number, label.to_string()))
            .copied())
    }
}

/// Source repository with a fixed merge history.
#[derive(Default)]
pub struct FakeUpstream {
    merges: Vec<MergedChange>,
    files: HashMap<u64, Vec<ChangedFile>>,
    tree: Vec<String>,
    fail_files: bool,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn merge(mut self, change: MergedChange, files: Vec<ChangedFile>) -> Self {
        self.files.insert(change.number, files);
        self.merges.push(change);
        self
    }

    #[must_use]
    pub fn tree(mut self, paths: &[&str]) -> Self {
        self.tree = strings(paths);
        self
    }

    /// Make every changed-files lookup fail.
    #[must_use]
    pub const fn failing_files(mut self) -> Self {
        self.fail_files = true;
        self
    }

    fn in_merge_order(&self) -> Vec<MergedChange> {
        let mut merges = self.merges.clone();
        merges.sort_by_key(|c| (c.merged_at, c.number));
        merges
    }
}

#[async_trait]
impl UpstreamSource for FakeUpstream {
    async fn merged_since(&self, after: u64) -> DomainResult<Vec<MergedChange>> {
        Ok(self
            .in_merge_order()
            .into_iter()
            .filter(|c| c.number > after)
            .collect())
    }

    async fn latest_merged(&self) -> DomainResult<Option<MergedChange>> {
        Ok(self.in_merge_order().pop())
    }

    async fn changed_files(&self, number: u64) -> DomainResult<Vec<ChangedFile>> {
        if self.fail_files {
            return Err(failure("list files of pull", number));
        }
        Ok(self.files.get(&number).cloned().unwrap_or_default())
    }

    async fn tree_paths(&self, _revision: &str) -> DomainResult<Vec<String>> {
        Ok(self.tree.clone())
    }
}

/// Static organization membership.
#[derive(Default)]
pub struct FakeDirectory {
    pub maintainers: Vec<String>,
    pub members: Vec<String>,
}

impl FakeDirectory {
    pub fn new(maintainers: &[&str], members: &[&str]) -> Self {
        Self {
            maintainers: strings(maintainers),
            members: strings(members),
        }
    }
}

#[async_trait]
impl MembershipDirectory for FakeDirectory {
    async fn maintainers(&self) -> DomainResult<Vec<String>> {
        Ok(self.maintainers.clone())
    }

    async fn members(&self) -> DomainResult<Vec<String>> {
        Ok(self.members.clone())
    }
}

/// Shepherd over the given fakes with the default test rules.
pub fn shepherd(
    tracker: Arc<FakeTracker>,
    upstream: FakeUpstream,
    directory: FakeDirectory,
) -> Shepherd {
    shepherd_with(rules(), tracker, upstream, directory)
}

/// Shepherd over the given fakes with a custom rule set.
pub fn shepherd_with(
    rules: RuleBook,
    tracker: Arc<FakeTracker>,
    upstream: FakeUpstream,
    directory: FakeDirectory,
) -> Shepherd {
    let ports = Ports {
        tracker,
        upstream: Arc::new(upstream),
        directory: Arc::new(directory),
    };
    Shepherd::new(rules, ports, Tuning::default())
}
