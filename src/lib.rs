//! # Spatial Agent
//!
//! Natural-language spatial analysis over uploaded GeoJSON layers.
//!
//! This library provides:
//! - A session-scoped layer registry holding parsed GeoJSON layers
//! - GIS operations (buffer, intersect, summarize) as agent tools
//! - An OpenAI-compatible chat client with tool calling
//! - An HTTP API and browser UI for uploads and queries
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Receive a question via the API
//! 2. Build context with system prompt, loaded layers and available tools
//! 3. Call the LLM, execute any tool calls against the session's layers
//! 4. Feed results back to the LLM, repeat until it answers
//!
//! ## Example
//!
//! ```rust,ignore
//! use spatial_agent::{agent::Agent, config::Config, layers::LayerRegistry};
//!
//! let config = Config::from_env()?;
//! let agent = Agent::new(config)?;
//! let layers = LayerRegistry::new();
//! let outcome = agent
//!     .run("Which schools lie in flood zones?", agent.default_model(), &layers)
//!     .await?;
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod gis;
pub mod layers;
pub mod llm;
pub mod tools;
pub mod util;

pub use config::Config;
