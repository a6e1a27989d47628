//! HTTP and websocket front-end for the agent registry.

#![forbid(unsafe_code)]

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod websocket;

pub use app::{create_app, AppState};
pub use config::ServiceConfig;
