//! HTTP surface: GitHub webhook receiver plus operator control endpoints.

pub mod auth;
pub mod payloads;
pub mod server;

pub use auth::{AuthError, TimestampAuth};
pub use payloads::WebhookEvent;
pub use server::WebhookServer;
