//! Adapters implementing the domain ports and the inbound HTTP surface.

pub mod github;
pub mod webhook;
