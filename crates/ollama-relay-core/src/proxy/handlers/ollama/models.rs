use axum::{extract::State, Json};
use bytes::Bytes;
use serde_json::{json, Map, Value};

use super::parse_body;
use crate::proxy::common::OllamaError;
use crate::proxy::server::AppState;
use ollama_relay_types::protocol::ollama::{
    ModelDetails, ModelEntry, ShowRequest, ShowResponse, TagsResponse,
};
use ollama_relay_types::GatewayError;

const TEMPLATE: &str = "{{ if .System }}{{ .System }}\n{{ end }}{{ if .Prompt }}{{ .Prompt }}{{ end }}";

/// `GET /` and `HEAD /`. Ollama clients probe this before anything else.
pub async fn handle_root() -> Json<Value> {
    Json(json!({"status": "Ollama is running"}))
}

/// `GET /api/tags`: the configured aliases. Never touches the upstream.
pub async fn handle_list_models(State(state): State<AppState>) -> Json<TagsResponse> {
    let snapshot = state.snapshot.current().await;
    let models = snapshot
        .aliases
        .visible_names()
        .map(|name| ModelEntry {
            name: name.to_string(),
            model: name.to_string(),
            modified_at: snapshot.loaded_at.clone(),
            size: 0,
            digest: String::new(),
            details: ModelDetails::default(),
        })
        .collect();
    Json(TagsResponse { models })
}

/// `POST /api/show`: a synthesized description of the aliased model.
pub async fn handle_show(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ShowResponse>, OllamaError> {
    let request: ShowRequest = parse_body(&body)?;
    let name = request.model_name().ok_or_else(|| GatewayError::malformed("model is required"))?;

    let snapshot = state.snapshot.current().await;
    let upstream_model = snapshot.aliases.resolve(name);

    let mut model_info = Map::new();
    model_info.insert("general.architecture".to_string(), json!("openai"));
    model_info.insert("general.basename".to_string(), json!(upstream_model));

    Ok(Json(ShowResponse {
        modelfile: format!("FROM {}\nTEMPLATE \"\"\"{}\"\"\"\n", upstream_model, TEMPLATE),
        parameters: String::new(),
        template: TEMPLATE.to_string(),
        details: ModelDetails::default(),
        model_info,
        capabilities: vec!["completion".to_string()],
        modified_at: snapshot.loaded_at.clone(),
    }))
}
