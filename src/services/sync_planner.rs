//! Pure planning step of the synchronization engine.
//!
//! Turns an ordered list of changed files plus the current tracking issues
//! into at most one [`SyncMutation`] per title. All changes to one title are
//! folded into a single working tracked-file set before anything is emitted,
//! so no issue ever receives two competing edits from the same pass.

use std::collections::{BTreeMap, HashMap};

use super::feedback::mention_list;
use crate::domain::models::{
    BodyLayout, ChangeKind, ChangedFile, IssueDraft, IssueEdit, IssueSnapshot, RepoRef,
    SyncMutation, TrackedFiles, TrackingSettings,
};

/// Output of one planning run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub mutations: Vec<SyncMutation>,
    /// Files matching no include rule.
    pub ignored: usize,
    /// Files with an unrecognized change kind.
    pub skipped: usize,
    /// Removed or renamed-away paths with no tracking issue.
    pub orphaned: usize,
    /// Titles whose issue already reflected every change.
    pub unchanged: usize,
}

/// Working state for one title during planning.
struct TitleWork<'a> {
    existing: Option<&'a IssueSnapshot>,
    files: TrackedFiles,
    /// Include labels of the first file that created this entry.
    labels: Vec<String>,
    notes: Vec<String>,
}

pub struct SyncPlanner<'a> {
    tracking: &'a TrackingSettings,
    layout: &'a BodyLayout,
    needs_review: &'a [String],
    notify_assignees: bool,
}

impl<'a> SyncPlanner<'a> {
    pub const fn new(
        tracking: &'a TrackingSettings,
        layout: &'a BodyLayout,
        needs_review: &'a [String],
    ) -> Self {
        Self {
            tracking,
            layout,
            needs_review,
            notify_assignees: false,
        }
    }

    /// Announce changes to the assignees of updated issues.
    #[must_use]
    pub const fn with_notifications(mut self, enabled: bool) -> Self {
        self.notify_assignees = enabled;
        self
    }

    pub fn plan(&self, files: &[ChangedFile], existing: &HashMap<String, IssueSnapshot>) -> SyncPlan {
        let mut plan = SyncPlan::default();
        let mut work: BTreeMap<String, TitleWork<'_>> = BTreeMap::new();

        for file in files {
            match &file.kind {
                ChangeKind::Added | ChangeKind::Modified => {
                    if !self.upsert(&mut work, existing, &file.path, file) {
                        plan.ignored += 1;
                    }
                }
                ChangeKind::Removed => {
                    if !self.remove(&mut work, existing, &file.path, file) {
                        plan.orphaned += 1;
                    }
                }
                ChangeKind::Renamed => {
                    let added = self.upsert(&mut work, existing, &file.path, file);
                    let removed = file
                        .previous_path
                        .as_deref()
                        .is_some_and(|old| self.remove(&mut work, existing, old, file));
                    if !removed {
                        tracing::info!(
                            path = %file.path,
                            previous = ?file.previous_path,
                            pr = file.change_number,
                            "renamed file has no tracking issue for its old path"
                        );
                        plan.orphaned += 1;
                    }
                    if !added && !removed {
                        plan.ignored += 1;
                    }
                }
                ChangeKind::Unknown(status) => {
                    tracing::warn!(
                        path = %file.path,
                        status = %status,
                        pr = file.change_number,
                        "skipping file with unrecognized change kind"
                    );
                    plan.skipped += 1;
                }
            }
        }

        for (title, entry) in work {
            match self.finish(title, entry) {
                Some(mutation) => plan.mutations.push(mutation),
                None => plan.unchanged += 1,
            }
        }
        plan
    }

    fn entry<'w, 'e>(
        &self,
        work: &'w mut BTreeMap<String, TitleWork<'e>>,
        existing: &'e HashMap<String, IssueSnapshot>,
        title: String,
        labels: Vec<String>,
    ) -> &'w mut TitleWork<'e> {
        work.entry(title).or_insert_with_key(|title| {
            let issue = existing.get(title);
            TitleWork {
                existing: issue,
                files: issue.map(|i| self.layout.parse(&i.body)).unwrap_or_default(),
                labels,
                notes: Vec::new(),
            }
        })
    }

    /// Track `path`. Returns `false` when no include rule matches.
    fn upsert<'e>(
        &self,
        work: &mut BTreeMap<String, TitleWork<'e>>,
        existing: &'e HashMap<String, IssueSnapshot>,
        path: &str,
        file: &ChangedFile,
    ) -> bool {
        let Some(resolution) = self.tracking.includes.resolve(path) else {
            return false;
        };
        let entry = self.entry(work, existing, resolution.title, resolution.labels);
        entry.files.insert(path);
        entry.notes.push(note(path, &file.kind, file.change_number, self.source()));
        true
    }

    /// Stop tracking `path`. Returns `false` when no issue tracks its title.
    fn remove<'e>(
        &self,
        work: &mut BTreeMap<String, TitleWork<'e>>,
        existing: &'e HashMap<String, IssueSnapshot>,
        path: &str,
        file: &ChangedFile,
    ) -> bool {
        let Some(resolution) = self.tracking.includes.resolve(path) else {
            return false;
        };
        if !work.contains_key(&resolution.title) && !existing.contains_key(&resolution.title) {
            return false;
        }
        let entry = self.entry(work, existing, resolution.title, resolution.labels);
        entry.files.remove(path);
        entry.notes.push(note(path, &ChangeKind::Removed, file.change_number, self.source()));
        true
    }

    fn source(&self) -> &RepoRef {
        &self.layout.source.repo
    }

    fn finish(&self, title: String, entry: TitleWork<'_>) -> Option<SyncMutation> {
        let Some(issue) = entry.existing else {
            if entry.files.is_empty() {
                tracing::debug!(title = %title, "new title lost every file within the pass");
                return None;
            }
            let mut labels = entry.labels;
            for label in &self.tracking.labels {
                if !labels.contains(label) {
                    labels.push(label.clone());
                }
            }
            return Some(SyncMutation::Create {
                draft: IssueDraft {
                    body: self.layout.render(&entry.files),
                    title,
                    labels,
                    assignees: self.tracking.assignees.clone(),
                    milestone: self.tracking.milestone,
                },
            });
        };

        let labels = if entry.files.is_empty() {
            let mut labels = issue.labels.clone();
            for label in self.needs_review {
                if !labels.contains(label) {
                    labels.push(label.clone());
                }
            }
            labels
        } else {
            issue
                .labels
                .iter()
                .filter(|l| !self.needs_review.contains(l))
                .cloned()
                .collect()
        };

        let files_changed = entry.files != self.layout.parse(&issue.body);
        let labels_changed = labels != issue.labels;
        if !files_changed && !labels_changed {
            return None;
        }

        let notice = (self.notify_assignees && files_changed && !issue.assignees.is_empty())
            .then(|| {
                format!(
                    "{}tracked source files changed upstream:\n\n{}\n",
                    mention_list(&issue.assignees),
                    entry.notes.join("\n")
                )
            });

        Some(SyncMutation::Update {
            number: issue.number,
            title,
            edit: IssueEdit {
                body: files_changed.then(|| self.layout.render(&entry.files)),
                labels: labels_changed.then_some(labels),
                ..Default::default()
            },
            notice,
        })
    }
}

fn note(path: &str, kind: &ChangeKind, number: u64, source: &RepoRef) -> String {
    format!("- `{path}` {} in {}", kind.as_str(), source.pull_url(number))
}

/// Index tracking issues by title, skipping the pointer issue.
///
/// When two open issues share a title the oldest one wins.
pub fn index_by_title(
    issues: Vec<IssueSnapshot>,
    pointer_issue: Option<u64>,
) -> HashMap<String, IssueSnapshot> {
    let mut index: HashMap<String, IssueSnapshot> = HashMap::new();
    for issue in issues {
        if Some(issue.number) == pointer_issue {
            continue;
        }
        if let Some(kept) = index
            .get(&issue.title)
            .filter(|kept| kept.number < issue.number)
        {
            tracing::warn!(
                title = %issue.title,
                kept = kept.number,
                duplicate = issue.number,
                "duplicate tracking issue title"
            );
            continue;
        }
        index.insert(issue.title.clone(), issue);
    }
    index
}
