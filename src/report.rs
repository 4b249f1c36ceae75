//! Report generation: dataset query, tabular artifact, executive summary.

use std::sync::Arc;

use log::{debug, warn};

use crate::config::AssistantConfig;
use crate::dataset::{Cell, DatasetAccessor, Table, PRODUCT_COLUMN};
use crate::intent::{IntentEntities, ParsedIntent};
use crate::llm::{prompts, TextCompletion};

/// Payload of a successfully generated report.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub table_html: String,
    pub summary: String,
    pub client_name: String,
    pub total_records: usize,
    pub filters_applied: IntentEntities,
}

/// Outcome of a report request. The two business failures are distinct
/// variants, not errors: a missing client reference never touches the
/// dataset, while an empty result set carries sample suggestions.
#[derive(Debug, Clone)]
pub enum ReportOutcome {
    Generated(ReportData),
    NoClientIdentified {
        error: String,
        suggestion: String,
    },
    EmptyResultSet {
        error: String,
        available_clients: Vec<String>,
    },
    Failed {
        error: String,
    },
}

impl ReportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ReportOutcome::Generated(_))
    }
}

pub struct ReportGenerator {
    dataset: Arc<DatasetAccessor>,
    model: Arc<dyn TextCompletion>,
    config: Arc<AssistantConfig>,
}

impl ReportGenerator {
    pub fn new(
        dataset: Arc<DatasetAccessor>,
        model: Arc<dyn TextCompletion>,
        config: Arc<AssistantConfig>,
    ) -> Self {
        Self {
            dataset,
            model,
            config,
        }
    }

    /// Never panics and never surfaces a raw error; dataset faults become
    /// `Failed`, the two business conditions their own variants.
    pub fn generate(&self, intent: &ParsedIntent) -> ReportOutcome {
        let entities = &intent.entities;
        let Some(client_name) = entities.client_name.as_deref() else {
            return ReportOutcome::NoClientIdentified {
                error: "No se pudo identificar el cliente para el reporte".to_string(),
                suggestion: "Por favor, especifica el nombre del cliente".to_string(),
            };
        };

        let filtered = match self
            .dataset
            .filtered_rows(Some(client_name), entities.product.as_deref())
        {
            Ok(table) => table,
            Err(e) => {
                return ReportOutcome::Failed {
                    error: format!("Error generando reporte: {}", e),
                }
            }
        };

        if filtered.is_empty() {
            let mut available = self.dataset.client_list().unwrap_or_default();
            available.truncate(self.config.suggestion_sample);
            return ReportOutcome::EmptyResultSet {
                error: format!("No se encontraron datos para el cliente: {}", client_name),
                available_clients: available,
            };
        }

        debug!("Report for {:?}: {} rows", client_name, filtered.len());
        let table_html = render_html_table(&filtered, &self.config.table_classes);
        let summary = self.summarize(&filtered, client_name);

        ReportOutcome::Generated(ReportData {
            table_html,
            summary,
            client_name: client_name.to_string(),
            total_records: filtered.len(),
            filters_applied: entities.clone(),
        })
    }

    /// Second model call of the pipeline; a failure substitutes the
    /// deterministic template instead of failing the report.
    fn summarize(&self, table: &Table, client: &str) -> String {
        let products = table.distinct_text(PRODUCT_COLUMN).unwrap_or_default();
        let prompt = prompts::summary_prompt(client, table.len(), &products);
        match self.model.complete(&prompt, &self.config.summary_model) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("Summary generation fell back to template: {}", e);
                format!(
                    "Reporte generado para {} con {} registros encontrados.",
                    client,
                    table.len()
                )
            }
        }
    }
}

/// Renders `table` as an HTML artifact. Numeric cells are fixed to two
/// decimals; the class list is the presentation contract with the
/// consuming front-end.
pub fn render_html_table(table: &Table, classes: &str) -> String {
    if table.is_empty() {
        return "<p>No se encontraron datos para mostrar.</p>".to_string();
    }

    let mut html = format!("<table class=\"{}\">\n  <thead>\n    <tr>", classes);
    for column in table.columns() {
        html.push_str(&format!("<th>{}</th>", column));
    }
    html.push_str("</tr>\n  </thead>\n  <tbody>\n");
    for row in table.rows() {
        html.push_str("    <tr>");
        for cell in row {
            match cell {
                Cell::Number(value) => html.push_str(&format!("<td>{:.2}</td>", value)),
                cell => html.push_str(&format!("<td>{}</td>", cell)),
            }
        }
        html.push_str("</tr>\n");
    }
    html.push_str("  </tbody>\n</table>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let mut table = Table::new(vec!["Empresa".to_string(), "Capital".to_string()]);
        table.push_row(vec![
            Cell::Text("ACME".to_string()),
            Cell::Number(1500.5),
        ]);
        table.push_row(vec![Cell::Text("ACME".to_string()), Cell::Empty]);
        table
    }

    #[test]
    fn html_table_formats_numbers_to_two_decimals() {
        let html = render_html_table(&sample_table(), "table table-striped table-bordered");
        assert!(html.starts_with("<table class=\"table table-striped table-bordered\">"));
        assert!(html.contains("<th>Empresa</th><th>Capital</th>"));
        assert!(html.contains("<td>ACME</td><td>1500.50</td>"));
        assert!(html.contains("<td>ACME</td><td></td>"));
    }

    #[test]
    fn html_table_has_one_row_element_per_record() {
        let html = render_html_table(&sample_table(), "t");
        // one header <tr> plus one per data row
        assert_eq!(html.matches("<tr>").count(), 3);
    }

    #[test]
    fn empty_table_renders_placeholder() {
        let table = Table::new(vec!["Empresa".to_string()]);
        assert_eq!(
            render_html_table(&table, "t"),
            "<p>No se encontraron datos para mostrar.</p>"
        );
    }
}
