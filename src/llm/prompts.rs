//! Prompt construction for the two model calls of the pipeline.

use crate::chat::ConversationTurn;

/// Formats the most recent `turns` of `history` (given newest-first) as
/// chronological "`sender`: `text`" lines.
pub fn conversation_context(history: &[ConversationTurn], turns: usize) -> String {
    let mut lines: Vec<String> = history
        .iter()
        .take(turns)
        .map(|turn| format!("{}: {}", turn.sender.as_str(), turn.text))
        .collect();
    lines.reverse();
    lines.join("\n")
}

/// Classification prompt: conversation context, a sample of canonical
/// client names, the verbatim message and the fixed JSON response shape.
pub fn intent_prompt(message: &str, context: &str, clients: &[String]) -> String {
    format!(
        r#"Eres un asistente inteligente que ayuda con reportes empresariales y conversación general.

CONTEXTO DE CONVERSACIÓN PREVIA:
{context}

CLIENTES DISPONIBLES (algunos ejemplos):
{clients}

MENSAJE DEL USUARIO: "{message}"

Analiza el mensaje y determina la intención. Responde ÚNICAMENTE con un JSON válido siguiendo esta estructura:

{{
    "intent_type": "conversation|report_request|report_filter|client_info",
    "confidence": 0.0-1.0,
    "entities": {{
        "client_name": "nombre del cliente si se menciona",
        "product": "tipo de producto si se menciona (LEASING, COMERCIAL, FIANZAS, etc.)",
        "date_from": "fecha inicial si se menciona",
        "date_to": "fecha final si se menciona",
        "filters": ["lista de filtros mencionados"]
    }},
    "response_text": "respuesta natural para conversación normal, null para reportes"
}}

REGLAS:
- "conversation": Para saludos, preguntas generales, charla casual, información de últimos reportes que estén en el chat
- "report_request": Para solicitudes específicas de reportes o datos
- "report_filter": Para filtrar/modificar reportes existentes
- "client_info": Para información específica sobre un cliente
- Si mencionan un cliente, busca el más similar en la lista disponible
- Para conversación normal, incluye response_text con una respuesta natural
- Para reportes, response_text debe ser null
"#,
        clients = clients.join(", "),
    )
}

/// Executive-summary prompt over the aggregates of a generated report.
pub fn summary_prompt(client: &str, total_records: usize, products: &[String]) -> String {
    let products = if products.is_empty() {
        "No especificados".to_string()
    } else {
        products.join(", ")
    };
    format!(
        r#"Genera un resumen ejecutivo breve y profesional basado en estos datos:

Cliente: {client}
Total de registros: {total_records}
Productos: {products}

El resumen debe ser conciso (2-3 oraciones) y orientado a negocio.
"#,
    )
}
