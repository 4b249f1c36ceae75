//! Intent classification: model-backed with a deterministic fallback.
//!
//! The model is asked for a fixed-shape JSON object which is decoded
//! strictly into the wire types below; an unknown `intent_type`, missing
//! field or malformed payload is a decode error and routes to the
//! keyword fallback, exactly like a failed model invocation.

use std::sync::Arc;

use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::chat::ConversationTurn;
use crate::config::AssistantConfig;
use crate::dataset::DatasetAccessor;
use crate::error::Result;
use crate::llm::{prompts, TextCompletion};
use crate::matcher::ClientResolver;

/// Classified purpose of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IntentType {
    Conversation,
    ReportRequest,
    ReportFilter,
    ClientInfo,
}

/// Structured fields extracted from free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct IntentEntities {
    pub client_name: Option<String>,
    pub product: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub filters: Vec<String>,
}

/// One classified message, consumed immediately by the pipeline.
#[derive(Debug, Clone)]
pub struct ParsedIntent {
    pub intent_type: IntentType,
    pub confidence: f64,
    pub entities: IntentEntities,
    /// Populated for conversational intents only.
    pub response_text: Option<String>,
}

/// Shape the model is instructed to return.
#[derive(Debug, Deserialize, JsonSchema)]
struct IntentWire {
    intent_type: IntentType,
    confidence: f64,
    #[serde(default)]
    entities: IntentEntities,
    #[serde(default)]
    response_text: Option<String>,
}

/// JSON schema of the expected model response, for completion backends
/// that support schema-constrained output.
pub fn intent_response_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(IntentWire)).unwrap_or_default()
}

/// Keywords that route the fallback classifier to a report request.
const REPORT_KEYWORDS: &[&str] = &[
    "reporte", "informe", "datos", "mostrar", "ver", "generar", "cliente",
];

/// Canned reply when the fallback classifier lands on small talk.
pub const FALLBACK_REPLY: &str = "Entiendo, ¿en qué más puedo ayudarte?";

/// Deterministic keyword classifier used whenever the model path fails.
pub fn fallback_intent(message: &str) -> ParsedIntent {
    let lowered = message.to_lowercase();
    if REPORT_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        ParsedIntent {
            intent_type: IntentType::ReportRequest,
            confidence: 0.6,
            entities: IntentEntities::default(),
            response_text: None,
        }
    } else {
        ParsedIntent {
            intent_type: IntentType::Conversation,
            confidence: 0.7,
            entities: IntentEntities::default(),
            response_text: Some(FALLBACK_REPLY.to_string()),
        }
    }
}

/// Strips a Markdown code fence (```json or ```) wrapping `raw`.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    body.strip_suffix("```").unwrap_or(body).trim()
}

pub struct IntentClassifier {
    model: Arc<dyn TextCompletion>,
    dataset: Arc<DatasetAccessor>,
    resolver: ClientResolver,
    config: Arc<AssistantConfig>,
}

impl IntentClassifier {
    pub fn new(
        model: Arc<dyn TextCompletion>,
        dataset: Arc<DatasetAccessor>,
        config: Arc<AssistantConfig>,
    ) -> Self {
        let resolver = ClientResolver::new(config.similarity_threshold);
        Self {
            model,
            dataset,
            resolver,
            config,
        }
    }

    /// Never fails: any model or decode error lands in the fallback, and
    /// an unavailable client list degrades to an empty prompt sample.
    pub fn classify(&self, message: &str, history: &[ConversationTurn]) -> ParsedIntent {
        let clients = match self.dataset.client_list() {
            Ok(list) => list,
            Err(e) => {
                warn!("Client list unavailable for prompt context: {}", e);
                Vec::new()
            }
        };
        let sample = &clients[..clients.len().min(self.config.prompt_client_sample)];
        let context = prompts::conversation_context(history, self.config.history_context_turns);
        let prompt = prompts::intent_prompt(message, &context, sample);

        let mut intent = match self.model_classification(&prompt) {
            Ok(intent) => intent,
            Err(e) => {
                warn!("Intent classification fell back to keywords: {}", e);
                return fallback_intent(message);
            }
        };

        // Canonicalize the client reference; an unresolvable name is kept
        // as typed, never an error.
        if let Some(raw_name) = intent.entities.client_name.clone() {
            if let Some(canonical) = self.resolver.resolve(&raw_name, &clients) {
                debug!("Canonicalized client {:?} -> {:?}", raw_name, canonical);
                intent.entities.client_name = Some(canonical.to_string());
            }
        }
        intent
    }

    fn model_classification(&self, prompt: &str) -> Result<ParsedIntent> {
        let raw = self.model.complete(prompt, &self.config.intent_model)?;
        let wire: IntentWire = serde_json::from_str(strip_code_fences(&raw))?;
        Ok(ParsedIntent {
            intent_type: wire.intent_type,
            confidence: wire.confidence,
            entities: wire.entities,
            response_text: wire.response_text,
        })
    }
}
