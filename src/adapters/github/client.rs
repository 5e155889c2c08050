//! GitHub HTTP client.
//!
//! Thin wrapper over the GitHub REST API v3. Every method returns
//! [`DomainResult`]: network failures map to [`DomainError::Transport`],
//! non-success statuses to [`DomainError::RemoteStatus`] (with the response
//! body) and unparseable payloads to [`DomainError::Decode`].
//!
//! Request pacing is not handled here; the services layer throttles
//! mutations through [`crate::services::DispatchThrottle`].

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::errors::{DomainError, DomainResult};

/// Base URL for the GitHub REST API v3.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

const PER_PAGE: u32 = 100;

/// Upper bound on pages followed by one listing (10 000 items).
const MAX_PAGES: u32 = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: String,
}

impl GitHubClient {
    /// Create a client authenticated with `token` against `api_base`.
    ///
    /// `api_base` is normally [`GITHUB_API_BASE`]; tests point it at a mock server.
    pub fn new(token: &str, api_base: &str) -> DomainResult<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            DomainError::Configuration("GitHub token contains invalid characters".to_string())
        })?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static("2022-11-28"));
        headers.insert(USER_AGENT, HeaderValue::from_static("issue-shepherd"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.api_base, path))
    }

    /// `GET path` and decode the body.
    pub async fn get<T: DeserializeOwned>(&self, operation: &str, path: &str) -> DomainResult<T> {
        self.get_query(operation, path, &[]).await
    }

    /// `GET path?query` and decode the body. Values are URL-encoded.
    pub async fn get_query<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> DomainResult<T> {
        let resp = send(operation, self.request(Method::GET, path).query(query)).await?;
        decode(operation, resp).await
    }

    /// Send `body` with `method` and decode the response.
    pub async fn send_json<B, T>(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        body: &B,
    ) -> DomainResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let resp = send(operation, self.request(method, path).json(body)).await?;
        decode(operation, resp).await
    }

    /// Send `body` with `method`, ignoring the response payload.
    pub async fn send_discard<B: Serialize + Sync>(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        body: &B,
    ) -> DomainResult<()> {
        send(operation, self.request(method, path).json(body)).await?;
        Ok(())
    }

    /// One page of a listing.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
        page: u32,
    ) -> DomainResult<Vec<T>> {
        let mut paged = query.to_vec();
        paged.push(("per_page", PER_PAGE.to_string()));
        paged.push(("page", page.to_string()));
        self.get_query(operation, path, &paged).await
    }

    /// Every page of a listing, stopping at the first short page.
    pub async fn paginate<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> DomainResult<Vec<T>> {
        let mut items = Vec::new();
        for page in 1..=MAX_PAGES {
            let batch: Vec<T> = self.get_page(operation, path, query, page).await?;
            let short = batch.len() < PER_PAGE as usize;
            items.extend(batch);
            if short {
                return Ok(items);
            }
        }
        tracing::warn!(operation, pages = MAX_PAGES, "pagination limit reached, listing truncated");
        Ok(items)
    }

    pub const fn per_page() -> usize {
        PER_PAGE as usize
    }
}

async fn send(operation: &str, req: RequestBuilder) -> DomainResult<Response> {
    let resp = req.send().await.map_err(|e| DomainError::Transport {
        operation: operation.to_string(),
        reason: e.to_string(),
    })?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(DomainError::RemoteStatus {
            operation: operation.to_string(),
            status,
            body,
        });
    }
    Ok(resp)
}

async fn decode<T: DeserializeOwned>(operation: &str, resp: Response) -> DomainResult<T> {
    resp.json::<T>().await.map_err(|e| DomainError::Decode {
        what: format!("{operation} response"),
        reason: e.to_string(),
    })
}
