//! GitHub webhook payloads, decoded by the `X-GitHub-Event` header.
//!
//! Only the fields the bot routes on are modelled; everything else in the
//! payload is ignored.

use serde::Deserialize;

use crate::adapters::github::models::{GitHubIssue, GitHubUser};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{EventContext, IssueSnapshot, IssueState, RepoRef};

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryPayload {
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentPayload {
    #[serde(default)]
    pub body: Option<String>,
    pub user: GitHubUser,
}

/// `issue_comment`
#[derive(Debug, Clone, Deserialize)]
pub struct IssueCommentEvent {
    pub action: String,
    pub issue: GitHubIssue,
    pub comment: CommentPayload,
    pub repository: RepositoryPayload,
    pub sender: GitHubUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationPayload {
    pub login: String,
}

/// `organization`
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationEvent {
    pub action: String,
    #[serde(default)]
    pub organization: Option<OrganizationPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamPayload {
    pub slug: String,
}

/// `membership`
#[derive(Debug, Clone, Deserialize)]
pub struct MembershipEvent {
    pub action: String,
    pub team: TeamPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    pub number: u64,
    #[serde(default)]
    pub merged: bool,
}

/// `pull_request`
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    pub action: String,
    pub pull_request: PullRequestPayload,
    pub repository: RepositoryPayload,
}

/// A decoded delivery.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    IssueComment(Box<IssueCommentEvent>),
    Organization(OrganizationEvent),
    Membership(MembershipEvent),
    PullRequest(PullRequestEvent),
    Ping,
    /// Any event the bot does not subscribe to, by name.
    Other(String),
}

fn parse<'a, T: Deserialize<'a>>(event: &str, body: &'a [u8]) -> DomainResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| DomainError::InvalidPayload(format!("{event}: {e}")))
}

impl WebhookEvent {
    pub fn parse(event: &str, body: &[u8]) -> DomainResult<Self> {
        Ok(match event {
            "issue_comment" => Self::IssueComment(Box::new(parse(event, body)?)),
            "organization" => Self::Organization(parse(event, body)?),
            "membership" => Self::Membership(parse(event, body)?),
            "pull_request" => Self::PullRequest(parse(event, body)?),
            "ping" => Self::Ping,
            other => Self::Other(other.to_string()),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::IssueComment(_) => "issue_comment",
            Self::Organization(_) => "organization",
            Self::Membership(_) => "membership",
            Self::PullRequest(_) => "pull_request",
            Self::Ping => "ping",
            Self::Other(name) => name,
        }
    }
}

fn is_bot(user: &GitHubUser) -> bool {
    user.kind.as_deref() == Some("Bot") || user.login.ends_with("[bot]")
}

impl IssueCommentEvent {
    /// Why this comment must not run instructions, if it must not.
    pub fn skip_reason(&self, workspace: &RepoRef) -> Option<&'static str> {
        if self.action != "created" {
            return Some("comment was not created");
        }
        if !workspace.matches_full_name(&self.repository.full_name) {
            return Some("repository is not the workspace");
        }
        if self.issue.is_pull_request() {
            return Some("comment is on a pull request");
        }
        if IssueState::from_str(&self.issue.state) != Some(IssueState::Open) {
            return Some("issue is not open");
        }
        if is_bot(&self.sender) || is_bot(&self.comment.user) {
            return Some("sender is a bot");
        }
        None
    }

    /// Split into the engine's event context and the comment body.
    pub fn into_context(self, workspace: &RepoRef) -> (EventContext, String) {
        let body = self.comment.body.unwrap_or_default();
        let issue = IssueSnapshot::from(self.issue);
        let ctx = EventContext::new(
            workspace.owner.clone(),
            workspace.repository.clone(),
            self.comment.user.login,
            issue,
        );
        (ctx, body)
    }
}

impl PullRequestEvent {
    pub fn is_merge_into(&self, source: &RepoRef) -> bool {
        self.action == "closed"
            && self.pull_request.merged
            && source.matches_full_name(&self.repository.full_name)
    }
}

impl OrganizationEvent {
    pub fn changes_members(&self) -> bool {
        matches!(self.action.as_str(), "member_added" | "member_removed")
    }
}

impl MembershipEvent {
    pub fn changes_team(&self, team: Option<&str>) -> bool {
        team.is_some_and(|slug| slug.eq_ignore_ascii_case(&self.team.slug))
    }
}
