use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reporting_assistant::*;
use tempfile::TempDir;

const DATASET_CSV: &str = "\
Empresa,Fecha Venc.Cuota,Producto,Capital,Capital L/P,Capital Divisa,Fecha Vencimiento,weekmonth
ACME,2025-07-15,LEASING,1500.5,1200,300.25,2026-07-15,W3-07
ACME,2025-08-15,COMERCIAL,2000,1800,200,2026-08-15,W3-08
FOO,2025-09-15,LEASING,3000,2500,500,2026-09-15,W3-09
";

/// Completion backend scripted with a queue of canned outcomes, one per
/// expected model call.
struct ScriptedCompletion {
    responses: Mutex<VecDeque<Result<String>>>,
}

impl ScriptedCompletion {
    fn new(responses: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
        })
    }
}

impl TextCompletion for ScriptedCompletion {
    fn complete(&self, _prompt: &str, _model: &str) -> Result<String> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ReportingError::ModelInvocation("script exhausted".to_string()))
            })
    }
}

fn failing_model() -> Arc<dyn TextCompletion> {
    Arc::new(move |_: &str, _: &str| -> Result<String> {
        Err(ReportingError::ModelInvocation("quota exceeded".to_string()))
    })
}

fn dataset_fixture() -> (TempDir, Arc<DatasetAccessor>) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run_off.csv");
    std::fs::write(&path, DATASET_CSV).unwrap();
    let cache = Arc::new(TableCache::new(Duration::from_secs(3600)));
    (dir, Arc::new(DatasetAccessor::new(path, cache)))
}

fn report_intent(client: Option<&str>, product: Option<&str>) -> ParsedIntent {
    ParsedIntent {
        intent_type: IntentType::ReportRequest,
        confidence: 0.9,
        entities: IntentEntities {
            client_name: client.map(str::to_string),
            product: product.map(str::to_string),
            ..IntentEntities::default()
        },
        response_text: None,
    }
}

#[test]
fn client_list_dedupes_and_keeps_order() {
    let (_dir, dataset) = dataset_fixture();
    assert_eq!(dataset.client_list().unwrap(), vec!["ACME", "FOO"]);
}

#[test]
fn missing_dataset_file_is_a_data_source_error() {
    let cache = Arc::new(TableCache::new(Duration::from_secs(3600)));
    let dataset = DatasetAccessor::new("/no/such/file.csv", cache);
    assert!(matches!(
        dataset.client_list(),
        Err(ReportingError::DataSource(_))
    ));
}

#[test]
fn cached_dataset_is_shared_between_reads() {
    let (_dir, dataset) = dataset_fixture();
    let first = dataset.dataset().unwrap();
    let second = dataset.dataset().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn model_failure_on_small_talk_falls_back_to_greeting() {
    let (_dir, dataset) = dataset_fixture();
    let pipeline = ReportingPipeline::new(dataset, failing_model(), AssistantConfig::default());

    // classify never raises and compose returns the canned text verbatim
    assert_eq!(pipeline.handle_message("hola", &[]), FALLBACK_REPLY);
}

#[test]
fn model_failure_on_report_keywords_reaches_the_report_path() {
    let (_dir, dataset) = dataset_fixture();
    let pipeline = ReportingPipeline::new(dataset, failing_model(), AssistantConfig::default());

    // fallback classifies as report request with empty entities, so the
    // generator answers with the no-client error
    assert_eq!(
        pipeline.handle_message("dame el reporte", &[]),
        "No se pudo identificar el cliente para el reporte"
    );
}

#[test]
fn report_request_resolves_canonical_client_and_renders() {
    let (_dir, dataset) = dataset_fixture();
    let model = ScriptedCompletion::new(vec![
        Ok(r#"{"intent_type":"report_request","confidence":0.9,"entities":{"client_name":"acme"}}"#.to_string()),
        Ok("Resumen ejecutivo de prueba.".to_string()),
    ]);
    let pipeline = ReportingPipeline::new(dataset, model, AssistantConfig::default());

    let composed = pipeline.handle_message("dame el reporte de ACME", &[]);
    assert!(composed.contains("<strong>Reporte generado para:</strong> ACME"));
    assert!(composed.contains("Resumen ejecutivo de prueba."));
    assert!(composed.contains("<td>ACME</td>"));
    assert!(!composed.contains("<td>FOO</td>"));
}

#[test]
fn composed_report_round_trips_client_and_record_count() {
    let (_dir, dataset) = dataset_fixture();
    let model = ScriptedCompletion::new(vec![
        Ok(r#"{"intent_type":"report_request","confidence":0.9,"entities":{"client_name":"ACME"}}"#.to_string()),
        Ok("Resumen.".to_string()),
    ]);
    let pipeline = ReportingPipeline::new(dataset, model, AssistantConfig::default());

    let composed = pipeline.handle_message("reporte de ACME", &[]);

    let client = composed
        .split("<strong>Reporte generado para:</strong> ")
        .nth(1)
        .and_then(|rest| rest.split("</p>").next())
        .unwrap();
    assert_eq!(client.trim(), "ACME");

    // one <tr> belongs to the header row
    assert_eq!(composed.matches("<tr>").count() - 1, 2);
}

#[test]
fn fenced_model_output_is_parsed_and_summary_falls_back() {
    let (_dir, dataset) = dataset_fixture();
    let model = ScriptedCompletion::new(vec![
        Ok("```json\n{\"intent_type\":\"report_request\",\"confidence\":0.9,\"entities\":{\"client_name\":\"acme\"}}\n```".to_string()),
        Err(ReportingError::ModelInvocation("timeout".to_string())),
    ]);
    let pipeline = ReportingPipeline::new(dataset, model, AssistantConfig::default());

    let composed = pipeline.handle_message("reporte de acme", &[]);
    assert!(composed.contains("Reporte generado para ACME con 2 registros encontrados."));
}

#[test]
fn unknown_intent_type_routes_to_the_fallback() {
    let (_dir, dataset) = dataset_fixture();
    let model = ScriptedCompletion::new(vec![Ok(
        r#"{"intent_type":"smalltalk","confidence":0.9,"entities":{}}"#.to_string(),
    )]);
    let pipeline = ReportingPipeline::new(dataset, model, AssistantConfig::default());

    assert_eq!(pipeline.handle_message("hola", &[]), FALLBACK_REPLY);
}

#[test]
fn generate_without_client_never_queries_the_dataset() {
    let cache = Arc::new(TableCache::new(Duration::from_secs(3600)));
    // nonexistent path: any dataset access would fail, not report NoClient
    let dataset = Arc::new(DatasetAccessor::new("/no/such/file.csv", cache));
    let generator = ReportGenerator::new(
        dataset,
        failing_model(),
        Arc::new(AssistantConfig::default()),
    );

    match generator.generate(&report_intent(None, None)) {
        ReportOutcome::NoClientIdentified { error, suggestion } => {
            assert!(error.contains("identificar el cliente"));
            assert!(suggestion.contains("especifica el nombre"));
        }
        other => panic!("expected NoClientIdentified, got {:?}", other),
    }
}

#[test]
fn generate_for_unknown_client_suggests_alternatives() {
    let (_dir, dataset) = dataset_fixture();
    let generator = ReportGenerator::new(
        dataset,
        failing_model(),
        Arc::new(AssistantConfig::default()),
    );

    match generator.generate(&report_intent(Some("ZZZ CORP"), None)) {
        ReportOutcome::EmptyResultSet {
            error,
            available_clients,
        } => {
            assert!(error.contains("ZZZ CORP"));
            assert!(available_clients.len() <= 5);
            assert!(available_clients.contains(&"ACME".to_string()));
        }
        other => panic!("expected EmptyResultSet, got {:?}", other),
    }
}

#[test]
fn generate_with_broken_dataset_fails_structurally() {
    let cache = Arc::new(TableCache::new(Duration::from_secs(3600)));
    let dataset = Arc::new(DatasetAccessor::new("/no/such/file.csv", cache));
    let generator = ReportGenerator::new(
        dataset,
        failing_model(),
        Arc::new(AssistantConfig::default()),
    );

    match generator.generate(&report_intent(Some("ACME"), None)) {
        ReportOutcome::Failed { error } => assert!(error.contains("Error generando reporte")),
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[test]
fn product_filter_narrows_the_report() {
    let (_dir, dataset) = dataset_fixture();
    let generator = ReportGenerator::new(
        dataset,
        failing_model(),
        Arc::new(AssistantConfig::default()),
    );

    match generator.generate(&report_intent(Some("ACME"), Some("LEASING"))) {
        ReportOutcome::Generated(data) => {
            assert_eq!(data.total_records, 1);
            assert_eq!(data.client_name, "ACME");
            assert_eq!(
                data.summary,
                "Reporte generado para ACME con 1 registros encontrados."
            );
            assert_eq!(data.filters_applied.product.as_deref(), Some("LEASING"));
        }
        other => panic!("expected Generated, got {:?}", other),
    }
}

#[test]
fn client_info_is_rendered_as_stringified_summary() {
    let (_dir, dataset) = dataset_fixture();
    let model = ScriptedCompletion::new(vec![Ok(
        r#"{"intent_type":"client_info","confidence":0.8,"entities":{"client_name":"acme"}}"#
            .to_string(),
    )]);
    let pipeline = ReportingPipeline::new(dataset, model, AssistantConfig::default());

    assert_eq!(
        pipeline.handle_message("info de acme", &[]),
        r#"{"client":"ACME","total_records":2,"products":["LEASING","COMERCIAL"]}"#
    );
}

#[test]
fn client_info_without_client_asks_for_one() {
    let (_dir, dataset) = dataset_fixture();
    let model = ScriptedCompletion::new(vec![Ok(
        r#"{"intent_type":"client_info","confidence":0.8,"entities":{}}"#.to_string(),
    )]);
    let pipeline = ReportingPipeline::new(dataset, model, AssistantConfig::default());

    assert_eq!(
        pipeline.handle_message("info", &[]),
        "¿Sobre qué cliente te gustaría obtener información?"
    );
}

#[test]
fn chat_service_persists_both_sides_of_the_exchange() {
    let (_dir, dataset) = dataset_fixture();
    let pipeline = ReportingPipeline::new(dataset, failing_model(), AssistantConfig::default());
    let log: Arc<InMemoryMessageLog> = Arc::new(InMemoryMessageLog::new());
    let service = ChatService::new(pipeline, Arc::clone(&log) as Arc<dyn MessageLog>);

    let reply = service.respond(7, "hola").unwrap();
    assert_eq!(reply, FALLBACK_REPLY);

    let recent = log.list_recent(7, 10).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].sender, Sender::Ai);
    assert_eq!(recent[0].text, FALLBACK_REPLY);
    assert_eq!(recent[1].sender, Sender::User);
    assert_eq!(recent[1].text, "hola");
}

#[test]
fn prior_turns_reach_the_classification_prompt() {
    let (_dir, dataset) = dataset_fixture();
    let prompts: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&prompts);
    let model: Arc<dyn TextCompletion> = Arc::new(move |prompt: &str, _: &str| -> Result<String> {
        recorded.lock().unwrap().push(prompt.to_string());
        Err(ReportingError::ModelInvocation("scripted".to_string()))
    });
    let pipeline = ReportingPipeline::new(dataset, model, AssistantConfig::default());
    let log: Arc<InMemoryMessageLog> = Arc::new(InMemoryMessageLog::new());
    log.append_message(3, Sender::User, "buenas tardes").unwrap();
    log.append_message(3, Sender::Ai, "hola, ¿en qué ayudo?").unwrap();
    let service = ChatService::new(pipeline, Arc::clone(&log) as Arc<dyn MessageLog>);

    service.respond(3, "sigo aquí").unwrap();

    let seen = prompts.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("user: buenas tardes\nai: hola, ¿en qué ayudo?"));
    assert!(seen[0].contains("MENSAJE DEL USUARIO: \"sigo aquí\""));
    // the window is read before the new message is appended
    assert!(!seen[0].contains("user: sigo aquí"));
}
