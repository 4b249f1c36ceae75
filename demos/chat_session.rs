//! Walks the full pipeline with a canned completion backend: small talk,
//! a report request and a client lookup against a tiny run-off extract.
//!
//! Run with `cargo run --example chat_session`.

use std::sync::Arc;

use anyhow::Result;
use reporting_assistant::{
    AssistantConfig, ChatService, DatasetAccessor, InMemoryMessageLog, MessageLog,
    ReportingError, ReportingPipeline, TableCache, TextCompletion,
};

const DATASET_CSV: &str = "\
Empresa,Fecha Venc.Cuota,Producto,Capital,Capital L/P,Capital Divisa,Fecha Vencimiento,weekmonth
ACME CORP,2025-07-15,LEASING,1500.5,1200,300.25,2026-07-15,W3-07
ACME CORP,2025-08-15,COMERCIAL,2000,1800,200,2026-08-15,W3-08
FOO SA,2025-09-15,LEASING,3000,2500,500,2026-09-15,W3-09
";

/// Stands in for the completion service: answers the summary prompt with a
/// canned sentence, classification prompts by keyword, and everything
/// else with an error so the deterministic fallbacks show up too.
fn canned_model(prompt: &str, _model: &str) -> reporting_assistant::Result<String> {
    if prompt.contains("resumen ejecutivo") {
        return Ok(
            "ACME CORP mantiene dos operaciones vigentes con capital concentrado en leasing. \
             La cartera no presenta vencimientos inmediatos."
                .to_string(),
        );
    }
    if prompt.contains("MENSAJE DEL USUARIO: \"dame el reporte de acme\"") {
        return Ok(
            r#"{"intent_type":"report_request","confidence":0.93,"entities":{"client_name":"acme corp"}}"#
                .to_string(),
        );
    }
    if prompt.contains("MENSAJE DEL USUARIO: \"qué sabes de foo\"") {
        return Ok(
            r#"{"intent_type":"client_info","confidence":0.85,"entities":{"client_name":"foo"}}"#
                .to_string(),
        );
    }
    Err(ReportingError::ModelInvocation(
        "canned model has no script for this prompt".to_string(),
    ))
}

fn main() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let dataset_path = dir.path().join("run_off.csv");
    std::fs::write(&dataset_path, DATASET_CSV)?;

    let config = AssistantConfig::default();
    let cache = Arc::new(TableCache::new(config.cache_ttl()));
    let dataset = Arc::new(DatasetAccessor::new(dataset_path, cache));
    let model: Arc<dyn TextCompletion> = Arc::new(canned_model);

    let pipeline = ReportingPipeline::new(dataset, model, config);
    let log = Arc::new(InMemoryMessageLog::new());
    let service = ChatService::new(pipeline, Arc::clone(&log) as Arc<dyn MessageLog>);

    for message in ["hola", "dame el reporte de acme", "qué sabes de foo"] {
        let reply = service.respond(1, message)?;
        println!("user: {}", message);
        println!("ai:   {}\n", reply);
    }

    Ok(())
}
