//! Instruction engine scenarios against in-memory ports.

mod common;

use std::sync::Arc;

use common::{
    comment_on, issue, setup_test_logging, shepherd, FakeDirectory, FakeTracker, FakeUpstream, RULES,
};
use issue_shepherd::domain::models::Gate;
use issue_shepherd::services::{InstructionOutcome, MembershipCache};
use issue_shepherd::{InstructionEngine, RuleLoader};

fn members() -> FakeDirectory {
    FakeDirectory::new(&["maria"], &["alice", "maria"])
}

#[tokio::test]
async fn test_accept_assigns_commenter_and_reports_success() {
    setup_test_logging();
    let tracker = Arc::new(FakeTracker::with_issues([issue(
        7,
        "docs",
        &["status/available"],
        &[],
    )]));
    let bot = shepherd(tracker.clone(), FakeUpstream::new(), members());

    let ctx = comment_on("alice", tracker.issue(7).unwrap());
    let report = bot.handle_comment(&ctx, "/accept").await;

    assert_eq!(report.applied, 1);
    assert_eq!(report.rejected, 0);

    let stored = tracker.issue(7).unwrap();
    assert_eq!(stored.labels, vec!["status/pending"]);
    assert_eq!(stored.assignees, vec!["alice"]);

    // Feedback describes the state after the edit.
    assert_eq!(tracker.comments(), vec![(7, "assigned to @alice ".to_string())]);
}

#[tokio::test]
async fn test_capacity_limit_rejects_third_accept() {
    setup_test_logging();
    let tracker = Arc::new(FakeTracker::with_issues([
        issue(2, "blog", &["status/pending"], &["alice"]),
        issue(3, "news", &["status/pending"], &["alice"]),
        issue(7, "docs", &["status/available"], &[]),
    ]));
    let bot = shepherd(tracker.clone(), FakeUpstream::new(), members());

    let ctx = comment_on("alice", tracker.issue(7).unwrap());
    let report = bot.handle_comment(&ctx, "/accept").await;

    assert_eq!(report.applied, 0);
    assert_eq!(report.rejected, 1);
    assert!(tracker.edits().is_empty());

    let comments = tracker.comments();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].0, 7);
    assert!(comments[0].1.contains('2'), "feedback was {:?}", comments[0].1);
    assert_eq!(comments[0].1, "@alice you already hold 2 issues");
}

#[tokio::test]
async fn test_one_below_capacity_still_accepts() {
    setup_test_logging();
    let tracker = Arc::new(FakeTracker::with_issues([
        issue(2, "blog", &["status/pending"], &["alice"]),
        issue(7, "docs", &["status/available"], &[]),
    ]));
    let bot = shepherd(tracker.clone(), FakeUpstream::new(), members());

    let ctx = comment_on("alice", tracker.issue(7).unwrap());
    let report = bot.handle_comment(&ctx, "/accept").await;

    assert_eq!(report.applied, 1);
    assert_eq!(report.rejected, 0);
    let stored = tracker.issue(7).unwrap();
    assert_eq!(stored.labels, vec!["status/pending"]);
    assert_eq!(stored.assignees, vec!["alice"]);
}

#[tokio::test]
async fn test_rule_without_permissions_rejects_even_maintainers() {
    setup_test_logging();
    let rules = RuleLoader::load_str(&format!(
        "{RULES}---
kind: IssueComment
metadata:
  name: close
spec:
  rules:
    instruct: /close
    permissions: []
    permission_feedback: '@commenter nobody may close issues'
  action:
    state: closed
"
    ))
    .unwrap();
    let flow = rules.flow("/close").unwrap().clone();

    let tracker = Arc::new(FakeTracker::with_issues([issue(7, "docs", &[], &["maria"])]));
    let membership = Arc::new(MembershipCache::new(Arc::new(members())));
    membership.refresh().await.unwrap();
    assert!(membership.is_maintainer("maria").await);
    let engine = InstructionEngine::new(Arc::new(rules), tracker.clone(), membership);

    let ctx = comment_on("maria", tracker.issue(7).unwrap());
    let outcome = engine.run(&flow, &ctx).await.unwrap();

    assert_eq!(
        outcome,
        InstructionOutcome::Rejected {
            gate: Gate::Permission,
            feedback_posted: true,
        }
    );
    assert!(tracker.edits().is_empty());
    assert_eq!(
        tracker.comments(),
        vec![(7, "@maria nobody may close issues".to_string())]
    );
}

#[tokio::test]
async fn test_non_member_is_rejected_without_edit() {
    setup_test_logging();
    let tracker = Arc::new(FakeTracker::with_issues([issue(
        7,
        "docs",
        &["status/available"],
        &[],
    )]));
    let bot = shepherd(tracker.clone(), FakeUpstream::new(), members());

    let ctx = comment_on("bob", tracker.issue(7).unwrap());
    let report = bot.handle_comment(&ctx, "/accept").await;

    assert_eq!(report.rejected, 1);
    assert!(tracker.edits().is_empty());
    assert_eq!(
        tracker.comments(),
        vec![(7, "@bob only organization members can accept issues".to_string())]
    );
    assert_eq!(tracker.issue(7).unwrap().labels, vec!["status/available"]);
}

#[tokio::test]
async fn test_later_instruction_sees_labels_from_earlier_one() {
    setup_test_logging();
    let tracker = Arc::new(FakeTracker::with_issues([issue(
        7,
        "docs",
        &["status/available"],
        &[],
    )]));
    let bot = shepherd(tracker.clone(), FakeUpstream::new(), members());

    // The event snapshot predates both instructions.
    let ctx = comment_on("alice", tracker.issue(7).unwrap());
    let report = bot.handle_comment(&ctx, "/accept\n/start").await;

    assert_eq!(report.applied, 2);
    let stored = tracker.issue(7).unwrap();
    assert_eq!(stored.labels, vec!["status/in-progress"]);
    assert_eq!(stored.assignees, vec!["alice"]);
    assert_eq!(tracker.edits().len(), 2);
}

#[tokio::test]
async fn test_state_gate_rejects_silently_without_feedback_template() {
    setup_test_logging();
    let tracker = Arc::new(FakeTracker::with_issues([issue(
        7,
        "docs",
        &["status/available"],
        &["alice"],
    )]));
    let bot = shepherd(tracker.clone(), FakeUpstream::new(), members());

    let ctx = comment_on("alice", tracker.issue(7).unwrap());
    let report = bot.handle_comment(&ctx, "/start").await;

    assert_eq!(report.rejected, 1);
    assert!(tracker.edits().is_empty());
    assert!(tracker.comments().is_empty());
}

#[tokio::test]
async fn test_unknown_instruction_and_plain_text_are_ignored() {
    let tracker = Arc::new(FakeTracker::with_issues([issue(
        7,
        "docs",
        &["status/available"],
        &[],
    )]));
    let bot = shepherd(tracker.clone(), FakeUpstream::new(), members());

    let ctx = comment_on("alice", tracker.issue(7).unwrap());
    let report = bot
        .handle_comment(&ctx, "thanks! /accept later maybe\n/frobnicate @maria")
        .await;

    assert_eq!(report.unknown, 1);
    assert_eq!(report.applied + report.rejected + report.failed, 0);
    assert!(tracker.edits().is_empty());
    assert!(tracker.comments().is_empty());
}
