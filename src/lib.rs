//! # Reporting Assistant
//!
//! Core of a conversational reporting assistant: a free-text user message
//! plus recent conversation history is classified into a typed intent,
//! fuzzy client references are resolved against the canonical dataset,
//! the matching rows are rendered as a tabular artifact with a
//! natural-language executive summary, and the whole exchange collapses
//! into a single response string for the chat log.
//!
//! ## Core Concepts
//!
//! - **Intent**: the classified purpose of a message — conversation,
//!   report request, report filter or client info. Classification is
//!   model-backed with a strict JSON decode; every failure routes to a
//!   deterministic keyword fallback, so the user always gets a reply.
//! - **Canonical client name**: the exact string stored in the dataset's
//!   client column. User-typed variants are resolved with a
//!   Ratcliff/Obershelp sequence ratio and a minimum-confidence threshold.
//! - **Tabular artifact**: an HTML rendering of the filtered rows with
//!   two-decimal numeric cells and a configurable class list.
//!
//! External collaborators — the completion service, the message log —
//! are traits the embedding application implements; a blocking Gemini
//! client is available behind the `gemini` feature.
//!
//! ## Example
//!
//! ```rust,ignore
//! use reporting_assistant::*;
//! use std::sync::Arc;
//!
//! let config = AssistantConfig::default();
//! let cache = Arc::new(TableCache::new(config.cache_ttl()));
//! let dataset = Arc::new(DatasetAccessor::new("media/run_off.csv", cache));
//! let model = Arc::new(GeminiClient::from_env()?);
//!
//! let pipeline = ReportingPipeline::new(dataset, model, config);
//! let service = ChatService::new(pipeline, Arc::new(InMemoryMessageLog::new()));
//!
//! let reply = service.respond(1, "dame el reporte de acme")?;
//! println!("{reply}");
//! ```

pub mod chat;
pub mod compose;
pub mod config;
pub mod dataset;
pub mod error;
pub mod intent;
pub mod llm;
pub mod matcher;
pub mod pipeline;
pub mod report;

pub use chat::{ChatId, ConversationTurn, InMemoryMessageLog, MessageId, MessageLog, Sender};
pub use compose::{
    ClientInfoSummary, IntentOutcome, ResponseComposer, DEFAULT_CONVERSATION_REPLY,
};
pub use config::AssistantConfig;
pub use dataset::{Cell, DatasetAccessor, Table, TableCache};
pub use error::{ReportingError, Result};
pub use intent::{
    fallback_intent, intent_response_schema, IntentClassifier, IntentEntities, IntentType,
    ParsedIntent, FALLBACK_REPLY,
};
pub use llm::TextCompletion;
#[cfg(feature = "gemini")]
pub use llm::GeminiClient;
pub use matcher::ClientResolver;
pub use pipeline::{ChatService, ReportingPipeline};
pub use report::{render_html_table, ReportData, ReportGenerator, ReportOutcome};
