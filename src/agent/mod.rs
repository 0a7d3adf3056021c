//! Agent module - turns a natural-language question into GIS tool calls.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Build context with system prompt (tools + loaded layers) and the user query
//! 2. Call the model with the available tool schemas
//! 3. If the model requests tool calls, execute them and feed results back
//! 4. Repeat until the model produces a final answer or max iterations is reached

mod agent_loop;
mod prompt;

pub use agent_loop::{Agent, AgentLogEntry, AgentOutcome, LogEntryType};
pub use prompt::build_system_prompt;
