//! [`MembershipDirectory`] backed by GitHub organization and team listings.

use async_trait::async_trait;
use serde::Deserialize;

use super::client::GitHubClient;
use crate::domain::errors::DomainResult;
use crate::domain::ports::MembershipDirectory;

#[derive(Debug, Deserialize)]
struct Member {
    login: String,
}

pub struct GitHubMembership {
    client: GitHubClient,
    org: String,
    /// Maintainer team slug; no team means no maintainers.
    team: Option<String>,
}

impl GitHubMembership {
    pub fn new(client: GitHubClient, org: impl Into<String>, team: Option<String>) -> Self {
        Self {
            client,
            org: org.into(),
            team,
        }
    }

    async fn logins(&self, operation: &str, path: &str) -> DomainResult<Vec<String>> {
        let members: Vec<Member> = self.client.paginate(operation, path, &[]).await?;
        Ok(members.into_iter().map(|m| m.login).collect())
    }
}

#[async_trait]
impl MembershipDirectory for GitHubMembership {
    async fn maintainers(&self) -> DomainResult<Vec<String>> {
        let Some(team) = &self.team else {
            return Ok(Vec::new());
        };
        let path = format!("/orgs/{}/teams/{team}/members", self.org);
        self.logins("list maintainer team members", &path).await
    }

    async fn members(&self) -> DomainResult<Vec<String>> {
        let path = format!("/orgs/{}/members", self.org);
        self.logins("list organization members", &path).await
    }
}
