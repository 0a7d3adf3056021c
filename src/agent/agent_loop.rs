//! Core agent loop implementation.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::layers::LayerRegistry;
use crate::llm::{ChatMessage, LlmClient, OpenAiCompatibleClient, Role, ToolCall};
use crate::tools::ToolRegistry;
use crate::util::truncate_for_log;

use super::prompt::build_system_prompt;

/// Types of log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEntryType {
    /// Text the model produced alongside tool calls
    Thinking,
    /// Tool is being called
    ToolCall,
    /// Tool returned a result
    ToolResult,
    /// Tool returned an error, fed back to the model
    ToolError,
    /// Agent produced final response
    Response,
}

/// A single entry in the run's trace.
#[derive(Debug, Clone, Serialize)]
pub struct AgentLogEntry {
    /// Timestamp (RFC 3339)
    pub timestamp: String,

    pub entry_type: LogEntryType,

    pub content: String,
}

impl AgentLogEntry {
    fn new(entry_type: LogEntryType, content: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            entry_type,
            content: content.into(),
        }
    }
}

/// Everything a single query produced.
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
    /// Final natural-language answer
    pub answer: String,

    /// Tool-call trace
    pub log: Vec<AgentLogEntry>,

    /// Number of model calls made
    pub iterations: usize,

    /// Layers written during the run, in write order
    pub layers_written: Vec<String>,
}

/// The spatial analysis agent.
pub struct Agent {
    config: Config,
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
}

impl Agent {
    /// Create an agent that talks to the configured OpenAI-compatible endpoint.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let llm = Arc::new(OpenAiCompatibleClient::new(&config.llm)?);
        Ok(Self::with_client(config, llm))
    }

    /// Create an agent over any model client.
    pub fn with_client(config: Config, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            config,
            llm,
            tools: ToolRegistry::new(),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Answer `query` using the layers in `layers`.
    ///
    /// Tool failures are fed back to the model as observations. Model
    /// failures, an empty final answer, or an exhausted iteration budget end
    /// the run with an error.
    pub async fn run(
        &self,
        query: &str,
        model: &str,
        layers: &LayerRegistry,
    ) -> anyhow::Result<AgentOutcome> {
        let mut log = Vec::new();
        let start_revision = layers.revision().await;

        let layer_infos: Vec<_> = layers.layers().await.iter().map(|l| l.info()).collect();
        let system_prompt = build_system_prompt(&self.tools, &layer_infos);
        let mut messages = vec![ChatMessage::system(system_prompt), ChatMessage::user(query)];

        let tool_schemas = self.tools.get_tool_schemas();

        for iteration in 0..self.config.max_iterations {
            tracing::debug!("Agent iteration {}", iteration + 1);

            let response = self
                .llm
                .chat_completion(model, &messages, Some(&tool_schemas))
                .await?;

            if let Some(tool_calls) = response.tool_calls.as_ref().filter(|c| !c.is_empty()) {
                if let Some(thought) = response.content.as_deref().filter(|c| !c.trim().is_empty()) {
                    log.push(AgentLogEntry::new(LogEntryType::Thinking, thought));
                }

                messages.push(ChatMessage {
                    role: Role::Assistant,
                    content: response.content.clone(),
                    tool_calls: Some(tool_calls.clone()),
                    tool_call_id: None,
                });

                for tool_call in tool_calls {
                    log.push(AgentLogEntry::new(
                        LogEntryType::ToolCall,
                        format!(
                            "Calling tool: {} with args: {}",
                            tool_call.function.name, tool_call.function.arguments
                        ),
                    ));

                    let observation = match self.execute_tool_call(tool_call, layers).await {
                        Ok(output) => {
                            log.push(AgentLogEntry::new(
                                LogEntryType::ToolResult,
                                truncate_for_log(&output, 1000),
                            ));
                            output
                        }
                        Err(e) => {
                            tracing::warn!("Tool {} failed: {}", tool_call.function.name, e);
                            let message = format!("Error: {}", e);
                            log.push(AgentLogEntry::new(LogEntryType::ToolError, message.clone()));
                            message
                        }
                    };

                    messages.push(ChatMessage::tool_result(tool_call.id.clone(), observation));
                }

                continue;
            }

            // No tool calls - this is the final response
            return match response.content.filter(|c| !c.trim().is_empty()) {
                Some(answer) => {
                    log.push(AgentLogEntry::new(
                        LogEntryType::Response,
                        truncate_for_log(&answer, 2000),
                    ));
                    Ok(AgentOutcome {
                        answer,
                        log,
                        iterations: iteration + 1,
                        layers_written: layers.written_since(start_revision).await,
                    })
                }
                None => Err(anyhow::anyhow!("Model returned an empty response")),
            };
        }

        Err(anyhow::anyhow!(
            "Max iterations ({}) reached without a final answer",
            self.config.max_iterations
        ))
    }

    /// Execute a single tool call.
    ///
    /// Arguments that are not valid JSON are passed through as a plain string,
    /// which the GIS tools read as comma-separated positional input.
    async fn execute_tool_call(
        &self,
        tool_call: &ToolCall,
        layers: &LayerRegistry,
    ) -> anyhow::Result<String> {
        let raw = tool_call.function.arguments.trim();
        let args: Value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

        tracing::info!("Executing tool {} ({})", tool_call.function.name, raw);
        self.tools
            .execute(&tool_call.function.name, args, layers)
            .await
    }
}
