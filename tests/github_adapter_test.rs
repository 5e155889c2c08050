//! GitHub adapter tests against a mock HTTP server.

use chrono::{TimeZone, Utc};
use mockito::{Matcher, Server};
use serde_json::json;

use issue_shepherd::adapters::github::{
    GitHubClient, GitHubIssueTracker, GitHubMembership, GitHubUpstream,
};
use issue_shepherd::domain::errors::DomainError;
use issue_shepherd::domain::models::{
    ChangeKind, IssueEdit, IssueQuery, IssueState, RepoRef,
};
use issue_shepherd::{IssueTracker, MembershipDirectory, UpstreamSource};

fn client(server: &Server) -> GitHubClient {
    GitHubClient::new("t0ken", &server.url()).unwrap()
}

fn tracker(server: &Server) -> GitHubIssueTracker {
    GitHubIssueTracker::new(client(server), RepoRef::new("acme", "site"))
}

fn upstream(server: &Server) -> GitHubUpstream {
    GitHubUpstream::new(client(server), RepoRef::new("acme", "site"), "main")
}

fn issue_json(number: u64, labels: &[&str]) -> serde_json::Value {
    json!({
        "number": number,
        "title": format!("issue {number}"),
        "body": null,
        "state": "open",
        "labels": labels.iter().map(|l| json!({"name": l})).collect::<Vec<_>>(),
        "assignees": [{"login": "alice", "type": "User"}]
    })
}

#[tokio::test]
async fn test_missing_issue_maps_to_not_found() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/repos/acme/site/issues/9")
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .create_async()
        .await;

    let err = tracker(&server).get_issue(9).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, DomainError::IssueNotFound(9)));
}

#[tokio::test]
async fn test_list_issues_filters_pull_requests() {
    let mut server = Server::new_async().await;
    let mut pull = issue_json(4, &["tracking"]);
    pull["pull_request"] = json!({"url": "https://api.github.com/repos/acme/site/pulls/4"});
    let mock = server
        .mock("GET", Matcher::Regex(r"^/repos/acme/site/issues".to_string()))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("state".into(), "open".into()),
            Matcher::UrlEncoded("labels".into(), "tracking,lang/en".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_body(json!([issue_json(3, &["tracking", "lang/en"]), pull]).to_string())
        .create_async()
        .await;

    let query = IssueQuery::open_with_labels(&["tracking".to_string(), "lang/en".to_string()]);
    let issues = tracker(&server).list_issues(&query).await.unwrap();

    mock.assert_async().await;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].number, 3);
    assert_eq!(issues[0].body, "");
    assert_eq!(issues[0].assignees, vec!["alice"]);
}

#[tokio::test]
async fn test_edit_sends_only_changed_fields() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PATCH", "/repos/acme/site/issues/9")
        .match_header("authorization", "Bearer t0ken")
        .match_body(Matcher::Json(json!({
            "labels": ["status/pending"],
            "assignees": ["alice"],
            "state": "open"
        })))
        .with_body(issue_json(9, &["status/pending"]).to_string())
        .create_async()
        .await;

    let edit = IssueEdit {
        labels: Some(vec!["status/pending".into()]),
        assignees: Some(vec!["alice".into()]),
        state: Some(IssueState::Open),
        ..Default::default()
    };
    let issue = tracker(&server).edit_issue(9, &edit).await.unwrap();

    mock.assert_async().await;
    assert_eq!(issue.labels, vec!["status/pending"]);
}

#[tokio::test]
async fn test_post_comment() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/repos/acme/site/issues/9/comments")
        .match_body(Matcher::Json(json!({"body": "@alice thanks"})))
        .with_status(201)
        .with_body(r#"{"id": 1}"#)
        .create_async()
        .await;

    tracker(&server).post_comment(9, "@alice thanks").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_label_applied_at_takes_latest_matching_event() {
    let mut server = Server::new_async().await;
    let events = json!([
        {"event": "labeled", "label": {"name": "status/pending"}, "created_at": "2026-04-01T10:00:00Z"},
        {"event": "assigned", "created_at": "2026-04-02T10:00:00Z"},
        {"event": "labeled", "label": {"name": "status/available"}, "created_at": "2026-04-05T10:00:00Z"},
        {"event": "labeled", "label": {"name": "status/pending"}, "created_at": "2026-04-03T10:00:00Z"}
    ]);
    server
        .mock("GET", Matcher::Regex(r"^/repos/acme/site/issues/9/events".to_string()))
        .match_query(Matcher::Any)
        .with_body(events.to_string())
        .create_async()
        .await;

    let tracker = tracker(&server);
    let at = tracker.label_applied_at(9, "status/pending").await.unwrap();
    assert_eq!(at, Some(Utc.with_ymd_and_hms(2026, 4, 3, 10, 0, 0).unwrap()));
    assert_eq!(tracker.label_applied_at(9, "status/stale").await.unwrap(), None);
}

#[tokio::test]
async fn test_merged_since_stops_at_pointer_and_orders_by_merge_time() {
    let mut server = Server::new_async().await;
    let pulls = json!([
        {"number": 15, "merged_at": "2026-04-02T09:00:00Z", "merge_commit_sha": "s15"},
        {"number": 14, "merged_at": null, "merge_commit_sha": null},
        {"number": 13, "merged_at": "2026-04-03T09:00:00Z", "merge_commit_sha": "s13"},
        {"number": 12, "merged_at": "2026-04-01T09:00:00Z", "merge_commit_sha": "s12"},
        {"number": 11, "merged_at": "2026-03-30T09:00:00Z", "merge_commit_sha": "s11"}
    ]);
    let mock = server
        .mock("GET", Matcher::Regex(r"^/repos/acme/site/pulls".to_string()))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("state".into(), "closed".into()),
            Matcher::UrlEncoded("base".into(), "main".into()),
            Matcher::UrlEncoded("sort".into(), "created".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_body(pulls.to_string())
        .expect(1)
        .create_async()
        .await;

    let window = upstream(&server).merged_since(11).await.unwrap();

    mock.assert_async().await;
    let numbers: Vec<u64> = window.iter().map(|c| c.number).collect();
    assert_eq!(numbers, vec![12, 15, 13]);
    assert_eq!(window[2].merge_sha.as_deref(), Some("s13"));
}

#[tokio::test]
async fn test_changed_files_map_statuses() {
    let mut server = Server::new_async().await;
    let files = json!([
        {"filename": "content/en/a.md", "status": "added"},
        {"filename": "content/en/b.md", "status": "renamed", "previous_filename": "content/en/old.md"},
        {"filename": "content/en/c.md", "status": "copied"}
    ]);
    server
        .mock("GET", Matcher::Regex(r"^/repos/acme/site/pulls/12/files".to_string()))
        .match_query(Matcher::Any)
        .with_body(files.to_string())
        .create_async()
        .await;

    let changed = upstream(&server).changed_files(12).await.unwrap();

    assert_eq!(changed.len(), 3);
    assert_eq!(changed[0].kind, ChangeKind::Added);
    assert_eq!(changed[1].kind, ChangeKind::Renamed);
    assert_eq!(changed[1].previous_path.as_deref(), Some("content/en/old.md"));
    assert_eq!(changed[2].kind, ChangeKind::Unknown("copied".into()));
    assert!(changed.iter().all(|f| f.change_number == 12));
}

#[tokio::test]
async fn test_tree_paths_keep_blobs_only() {
    let mut server = Server::new_async().await;
    let tree = json!({
        "sha": "abc",
        "tree": [
            {"path": "content", "type": "tree"},
            {"path": "content/en/a.md", "type": "blob"},
            {"path": "themes/docsy", "type": "commit"}
        ],
        "truncated": false
    });
    server
        .mock("GET", Matcher::Regex(r"^/repos/acme/site/git/trees/abc".to_string()))
        .match_query(Matcher::UrlEncoded("recursive".into(), "1".into()))
        .with_body(tree.to_string())
        .create_async()
        .await;

    let paths = upstream(&server).tree_paths("abc").await.unwrap();
    assert_eq!(paths, vec!["content/en/a.md"]);
}

#[tokio::test]
async fn test_membership_listings() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", Matcher::Regex(r"^/orgs/acme/teams/maintainers/members".to_string()))
        .match_query(Matcher::Any)
        .with_body(r#"[{"login": "maria"}]"#)
        .create_async()
        .await;
    server
        .mock("GET", Matcher::Regex(r"^/orgs/acme/members".to_string()))
        .match_query(Matcher::Any)
        .with_body(r#"[{"login": "maria"}, {"login": "alice"}]"#)
        .create_async()
        .await;

    let directory = GitHubMembership::new(client(&server), "acme", Some("maintainers".into()));
    assert_eq!(directory.maintainers().await.unwrap(), vec!["maria"]);
    assert_eq!(directory.members().await.unwrap(), vec!["maria", "alice"]);

    let teamless = GitHubMembership::new(client(&server), "acme", None);
    assert!(teamless.maintainers().await.unwrap().is_empty());
}
