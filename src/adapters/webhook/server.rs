//! Webhook receiver and control plane.
//!
//! Routes:
//! - `POST /webhook`: GitHub deliveries, dispatched on `X-GitHub-Event`
//! - `POST /sync`, `POST /members/reload`, `POST /init`: operator triggers,
//!   each requiring `?token=<unix seconds>` inside the skew window
//! - `GET /health`: liveness and admission state, unauthenticated
//!
//! Webhook work is spawned so deliveries are acknowledged immediately.
//! Operator triggers run inline and answer with their report, or 409 when
//! the admission slot stays taken.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::auth::{verify_signature, TimestampAuth};
use super::payloads::WebhookEvent;
use crate::application::Shepherd;
use crate::domain::errors::{DomainError, DomainResult};
use crate::infrastructure::config::settings::AuthSettings;

type Reply = (StatusCode, Json<Value>);

struct AppState {
    shepherd: Arc<Shepherd>,
    auth: TimestampAuth,
    webhook_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    #[serde(default)]
    token: Option<String>,
}

pub struct WebhookServer {
    state: Arc<AppState>,
}

impl WebhookServer {
    pub fn new(shepherd: Arc<Shepherd>, auth: &AuthSettings) -> Self {
        Self {
            state: Arc::new(AppState {
                shepherd,
                auth: TimestampAuth::new(auth.max_skew_secs),
                webhook_secret: auth.webhook_secret.clone().filter(|s| !s.is_empty()),
            }),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/webhook", post(webhook))
            .route("/sync", post(sync))
            .route("/members/reload", post(reload_members))
            .route("/init", post(init))
            .route("/health", get(health))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Bind `addr` and serve until `shutdown` resolves.
    pub async fn serve<F>(self, addr: SocketAddr, shutdown: F) -> DomainResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            DomainError::Configuration(format!("failed to bind {addr}: {e}"))
        })?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> DomainResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = listener
            .local_addr()
            .map_err(|e| DomainError::Configuration(e.to_string()))?;
        tracing::info!(%addr, "webhook server listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| DomainError::Configuration(format!("server error: {e}")))
    }
}

fn reply(status: StatusCode, body: Value) -> Reply {
    (status, Json(body))
}

fn ignored(reason: &str) -> Reply {
    reply(StatusCode::OK, json!({"status": "ignored", "reason": reason}))
}

fn accepted(action: &str) -> Reply {
    reply(StatusCode::ACCEPTED, json!({"status": "accepted", "action": action}))
}

fn failure(err: &DomainError) -> Reply {
    match err {
        DomainError::Busy(_) => reply(StatusCode::CONFLICT, json!({"status": "busy"})),
        other => reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"status": "error", "error": other.to_string()}),
        ),
    }
}

fn authorize(state: &AppState, query: &TokenQuery) -> Result<(), Reply> {
    state
        .auth
        .verify(query.token.as_deref(), Utc::now().timestamp())
        .map_err(|e| {
            tracing::warn!(error = %e, "rejected control request");
            reply(
                StatusCode::UNAUTHORIZED,
                json!({"status": "unauthorized", "error": e.to_string()}),
            )
        })
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn health(State(state): State<Arc<AppState>>) -> Reply {
    reply(
        StatusCode::OK,
        json!({"status": "ok", "busy": state.shepherd.is_busy()}),
    )
}

async fn sync(State(state): State<Arc<AppState>>, Query(query): Query<TokenQuery>) -> Reply {
    if let Err(denied) = authorize(&state, &query) {
        return denied;
    }
    match state.shepherd.sync_now().await {
        Ok(report) => reply(StatusCode::OK, json!({"status": "ok", "report": report})),
        Err(e) => failure(&e),
    }
}

async fn init(State(state): State<Arc<AppState>>, Query(query): Query<TokenQuery>) -> Reply {
    if let Err(denied) = authorize(&state, &query) {
        return denied;
    }
    match state.shepherd.initialize().await {
        Ok(report) => reply(StatusCode::OK, json!({"status": "ok", "report": report})),
        Err(e) => failure(&e),
    }
}

async fn reload_members(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
) -> Reply {
    if let Err(denied) = authorize(&state, &query) {
        return denied;
    }
    match state.shepherd.reload_members().await {
        Ok((maintainers, members)) => reply(
            StatusCode::OK,
            json!({"status": "ok", "maintainers": maintainers, "members": members}),
        ),
        Err(e) => failure(&e),
    }
}

async fn webhook(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> Reply {
    if let Some(secret) = &state.webhook_secret {
        if let Err(e) = verify_signature(secret, &body, header(&headers, "x-hub-signature-256")) {
            tracing::warn!(error = %e, "rejected webhook delivery");
            return reply(
                StatusCode::UNAUTHORIZED,
                json!({"status": "unauthorized", "error": e.to_string()}),
            );
        }
    }

    let Some(event_name) = header(&headers, "x-github-event") else {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"status": "error", "error": "missing X-GitHub-Event header"}),
        );
    };
    let delivery = header(&headers, "x-github-delivery").unwrap_or("-").to_string();

    let event = match WebhookEvent::parse(event_name, &body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(event = event_name, %delivery, error = %e, "undecodable webhook payload");
            return reply(StatusCode::BAD_REQUEST, json!({"status": "error", "error": e.to_string()}));
        }
    };
    tracing::debug!(event = event.name(), %delivery, "webhook received");
    route(state.shepherd.clone(), event)
}

/// Hand one decoded delivery to the engine it belongs to.
fn route(shepherd: Arc<Shepherd>, event: WebhookEvent) -> Reply {
    let repository = &shepherd.rules().repository;
    match event {
        WebhookEvent::IssueComment(comment) => {
            if let Some(reason) = comment.skip_reason(&repository.workspace) {
                return ignored(reason);
            }
            let (ctx, body) = comment.into_context(&repository.workspace);
            tokio::spawn(async move {
                let report = shepherd.handle_comment(&ctx, &body).await;
                tracing::info!(
                    req_id = %ctx.request_id,
                    issue = ctx.issue.number,
                    applied = report.applied,
                    rejected = report.rejected,
                    failed = report.failed,
                    "comment handled"
                );
            });
            accepted("instructions")
        }
        WebhookEvent::Organization(org) => {
            if !org.changes_members() {
                return ignored("membership unchanged");
            }
            tokio::spawn(async move {
                if let Err(e) = shepherd.membership().refresh_members().await {
                    tracing::error!(error = %e, "member refresh failed");
                }
            });
            accepted("refresh_members")
        }
        WebhookEvent::Membership(membership) => {
            if !membership.changes_team(repository.maintainer_team.as_deref()) {
                return ignored("not the maintainer team");
            }
            tokio::spawn(async move {
                if let Err(e) = shepherd.membership().refresh_maintainers().await {
                    tracing::error!(error = %e, "maintainer refresh failed");
                }
            });
            accepted("refresh_maintainers")
        }
        WebhookEvent::PullRequest(pr) => {
            if !pr.is_merge_into(&repository.source.repo) {
                return ignored("not a merge into the source repository");
            }
            if repository.detection.pointer_issue.is_none() || shepherd.rules().tracking.is_none() {
                return ignored("sync is not configured");
            }
            let number = pr.pull_request.number;
            tokio::spawn(async move {
                match shepherd.sync_now().await {
                    Ok(report) => tracing::info!(
                        pr = number,
                        changes = report.changes,
                        failed = report.dispatched.failed,
                        "sync after merge finished"
                    ),
                    Err(DomainError::Busy(_)) => {
                        tracing::info!(pr = number, "sync already running, merge picked up later");
                    }
                    Err(e) => tracing::error!(pr = number, error = %e, "sync after merge failed"),
                }
            });
            accepted("sync")
        }
        WebhookEvent::Ping => reply(StatusCode::OK, json!({"status": "pong"})),
        WebhookEvent::Other(name) => {
            tracing::debug!(event = %name, "unsubscribed event");
            ignored("event not handled")
        }
    }
}
