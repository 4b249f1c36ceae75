use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable parameters of the assistant.
///
/// Every value that governs matching, sampling, caching or presentation
/// lives here; the defaults reproduce the production configuration.
///
/// | Field | Default |
/// |-------|---------|
/// | `similarity_threshold` | 0.3 |
/// | `prompt_client_sample` | 10 |
/// | `suggestion_sample` | 5 |
/// | `history_context_turns` | 5 |
/// | `history_fetch_limit` | 10 |
/// | `cache_ttl_secs` | 3600 |
/// | `intent_model` / `summary_model` | `gemini-1.5-flash` |
/// | `table_classes` | `table table-striped table-bordered` |
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Similarity a candidate client name must strictly exceed to be accepted.
    pub similarity_threshold: f64,
    /// How many canonical client names are embedded in the classification prompt.
    pub prompt_client_sample: usize,
    /// How many client names are suggested when a report query matches nothing.
    pub suggestion_sample: usize,
    /// Most recent turns formatted into the prompt context, oldest first.
    pub history_context_turns: usize,
    /// Turns fetched from the message log per incoming message.
    pub history_fetch_limit: usize,
    /// Seconds a parsed dataset stays cached before it is re-read.
    pub cache_ttl_secs: u64,
    /// Model name passed to the completion service for intent classification.
    pub intent_model: String,
    /// Model name passed to the completion service for the executive summary.
    pub summary_model: String,
    /// Class list on the rendered report table. Presentation contract with
    /// the consuming front-end.
    pub table_classes: String,
}

impl AssistantConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.3,
            prompt_client_sample: 10,
            suggestion_sample: 5,
            history_context_turns: 5,
            history_fetch_limit: 10,
            cache_ttl_secs: 3600,
            intent_model: "gemini-1.5-flash".to_string(),
            summary_model: "gemini-1.5-flash".to_string(),
            table_classes: "table table-striped table-bordered".to_string(),
        }
    }
}
