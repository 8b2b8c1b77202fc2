//! HTTP transport layer
//!
//! Welcome, health and app info endpoints.

pub mod handlers;
