//! HTTP API and browser UI.
//!
//! A browser session uploads layers, submits a question and renders the
//! agent's answer together with tables for the result layers.

mod layers;
mod query;
mod routes;
mod sessions;
pub mod types;
mod ui;

pub use routes::{router, serve, AppState};
pub use sessions::{Session, SessionStore};
