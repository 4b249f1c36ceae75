//! Maps pipeline outcomes onto the single persisted response string.

use serde::Serialize;

use crate::report::{ReportData, ReportOutcome};

/// Default reply when a conversational intent carried no model text.
pub const DEFAULT_CONVERSATION_REPLY: &str = "¿En qué puedo ayudarte hoy?";

/// Structured client summary. Rendered as stringified JSON: deliberately
/// plainer than the report markup, kept for compatibility with the
/// consuming front-end.
#[derive(Debug, Clone, Serialize)]
pub struct ClientInfoSummary {
    pub client: String,
    pub total_records: usize,
    pub products: Vec<String>,
}

/// Structured result of handling one classified message.
#[derive(Debug, Clone)]
pub enum IntentOutcome {
    /// Conversational reply; `None` means the model supplied no text.
    Conversation(Option<String>),
    Report(ReportOutcome),
    ClientInfo(ClientInfoSummary),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseComposer;

impl ResponseComposer {
    pub fn compose(&self, outcome: &IntentOutcome) -> String {
        match outcome {
            IntentOutcome::Conversation(text) => text
                .clone()
                .unwrap_or_else(|| DEFAULT_CONVERSATION_REPLY.to_string()),
            IntentOutcome::Report(report) => compose_report(report),
            IntentOutcome::ClientInfo(summary) => {
                serde_json::to_string(summary).unwrap_or_default()
            }
        }
    }
}

fn compose_report(outcome: &ReportOutcome) -> String {
    match outcome {
        ReportOutcome::Generated(data) => compose_generated(data),
        ReportOutcome::NoClientIdentified { error, .. }
        | ReportOutcome::EmptyResultSet { error, .. }
        | ReportOutcome::Failed { error } => error.clone(),
    }
}

fn compose_generated(data: &ReportData) -> String {
    format!(
        "<div>\n  <p><strong>Reporte generado para:</strong> {client}</p>\n  <p>{summary}</p>\n  <div style=\"overflow-x: auto; margin-top: 1em;\">\n{table}\n  </div>\n</div>",
        client = data.client_name,
        summary = data.summary,
        table = data.table_html,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::IntentEntities;

    #[test]
    fn conversation_text_is_returned_verbatim() {
        let composer = ResponseComposer;
        let outcome = IntentOutcome::Conversation(Some("hola, ¿qué tal?".to_string()));
        assert_eq!(composer.compose(&outcome), "hola, ¿qué tal?");
    }

    #[test]
    fn missing_conversation_text_gets_the_default() {
        let composer = ResponseComposer;
        assert_eq!(
            composer.compose(&IntentOutcome::Conversation(None)),
            DEFAULT_CONVERSATION_REPLY
        );
    }

    #[test]
    fn report_failures_compose_to_the_error_verbatim() {
        let composer = ResponseComposer;
        let outcome = IntentOutcome::Report(ReportOutcome::EmptyResultSet {
            error: "No se encontraron datos para el cliente: ACME".to_string(),
            available_clients: vec!["FOO".to_string()],
        });
        assert_eq!(
            composer.compose(&outcome),
            "No se encontraron datos para el cliente: ACME"
        );
    }

    #[test]
    fn generated_report_embeds_client_summary_and_table() {
        let composer = ResponseComposer;
        let outcome = IntentOutcome::Report(ReportOutcome::Generated(ReportData {
            table_html: "<table class=\"t\"></table>".to_string(),
            summary: "Dos registros vigentes.".to_string(),
            client_name: "ACME".to_string(),
            total_records: 2,
            filters_applied: IntentEntities::default(),
        }));

        let composed = composer.compose(&outcome);
        assert!(composed.contains("<strong>Reporte generado para:</strong> ACME"));
        assert!(composed.contains("<p>Dos registros vigentes.</p>"));
        assert!(composed.contains("overflow-x: auto"));
        assert!(composed.contains("<table class=\"t\"></table>"));
    }

    #[test]
    fn client_info_summary_is_stringified_json() {
        let composer = ResponseComposer;
        let outcome = IntentOutcome::ClientInfo(ClientInfoSummary {
            client: "ACME".to_string(),
            total_records: 2,
            products: vec!["LEASING".to_string()],
        });
        // compatibility target for the front-end, pinned exactly
        assert_eq!(
            composer.compose(&outcome),
            r#"{"client":"ACME","total_records":2,"products":["LEASING"]}"#
        );
    }
}
