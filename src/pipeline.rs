//! Per-message orchestration. Sequences the classifier, the report
//! generator and the composer; owns no business logic of its own.

use std::sync::Arc;

use log::info;

use crate::chat::{ChatId, ConversationTurn, MessageLog, Sender};
use crate::compose::{ClientInfoSummary, IntentOutcome, ResponseComposer};
use crate::config::AssistantConfig;
use crate::dataset::{DatasetAccessor, PRODUCT_COLUMN};
use crate::error::Result;
use crate::intent::{IntentClassifier, IntentType, ParsedIntent};
use crate::llm::TextCompletion;
use crate::report::ReportGenerator;

pub struct ReportingPipeline {
    classifier: IntentClassifier,
    generator: ReportGenerator,
    dataset: Arc<DatasetAccessor>,
    composer: ResponseComposer,
    config: Arc<AssistantConfig>,
}

impl ReportingPipeline {
    pub fn new(
        dataset: Arc<DatasetAccessor>,
        model: Arc<dyn TextCompletion>,
        config: AssistantConfig,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            classifier: IntentClassifier::new(
                Arc::clone(&model),
                Arc::clone(&dataset),
                Arc::clone(&config),
            ),
            generator: ReportGenerator::new(
                Arc::clone(&dataset),
                model,
                Arc::clone(&config),
            ),
            dataset,
            composer: ResponseComposer,
            config,
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Classifies `message` against `history` (newest-first) and produces
    /// the single response string. Always returns text, even under total
    /// model failure.
    pub fn handle_message(&self, message: &str, history: &[ConversationTurn]) -> String {
        let intent = self.classifier.classify(message, history);
        info!(
            "Classified message as {:?} (confidence {:.2})",
            intent.intent_type, intent.confidence
        );
        let outcome = self.dispatch(&intent);
        self.composer.compose(&outcome)
    }

    fn dispatch(&self, intent: &ParsedIntent) -> IntentOutcome {
        match intent.intent_type {
            IntentType::Conversation => {
                IntentOutcome::Conversation(intent.response_text.clone())
            }
            IntentType::ReportRequest | IntentType::ReportFilter => {
                IntentOutcome::Report(self.generator.generate(intent))
            }
            IntentType::ClientInfo => self.client_info(intent),
        }
    }

    fn client_info(&self, intent: &ParsedIntent) -> IntentOutcome {
        let Some(client) = intent.entities.client_name.as_deref() else {
            return IntentOutcome::Conversation(Some(
                "¿Sobre qué cliente te gustaría obtener información?".to_string(),
            ));
        };
        match self.dataset.filtered_rows(Some(client), None) {
            Ok(rows) if rows.is_empty() => IntentOutcome::Conversation(Some(format!(
                "No encontré información para el cliente: {}",
                client
            ))),
            Ok(rows) => IntentOutcome::ClientInfo(ClientInfoSummary {
                client: client.to_string(),
                total_records: rows.len(),
                products: rows.distinct_text(PRODUCT_COLUMN).unwrap_or_default(),
            }),
            Err(e) => IntentOutcome::Conversation(Some(format!(
                "Error obteniendo información del cliente: {}",
                e
            ))),
        }
    }
}

/// Drives the pipeline against a message log: one call per user message.
pub struct ChatService {
    pipeline: ReportingPipeline,
    log: Arc<dyn MessageLog>,
}

impl ChatService {
    pub fn new(pipeline: ReportingPipeline, log: Arc<dyn MessageLog>) -> Self {
        Self { pipeline, log }
    }

    /// Handles one incoming message: the history window is read before the
    /// message is appended, so the prompt context never contains the
    /// message being answered. Both sides of the exchange are persisted.
    pub fn respond(&self, chat_id: ChatId, text: &str) -> Result<String> {
        let limit = self.pipeline.config().history_fetch_limit;
        let history = self.log.list_recent(chat_id, limit)?;
        let response = self.pipeline.handle_message(text, &history);
        self.log.append_message(chat_id, Sender::User, text)?;
        self.log.append_message(chat_id, Sender::Ai, &response)?;
        Ok(response)
    }
}
