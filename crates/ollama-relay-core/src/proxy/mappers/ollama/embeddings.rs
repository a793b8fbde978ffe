use ollama_relay_types::protocol::ollama::{
    EmbeddingInput, EmbeddingOutput, EmbeddingRequest, EmbeddingResponse,
};
use ollama_relay_types::protocol::openai::{EmbeddingsRequest, EmbeddingsResponse};
use ollama_relay_types::GatewayError;

use super::request::required_model;
use crate::proxy::common::ModelAliasTable;

/// `POST /api/embeddings` → `POST {base}/embeddings`.
pub fn transform_embedding_request(
    request: EmbeddingRequest,
    aliases: &ModelAliasTable,
) -> Result<EmbeddingsRequest, GatewayError> {
    let model = required_model(request.model.as_deref(), aliases)?.to_string();
    let input = match request.prompt {
        Some(EmbeddingInput::Batch(items)) if items.is_empty() => {
            return Err(GatewayError::malformed("prompt is required"))
        },
        Some(input) => input,
        None => return Err(GatewayError::malformed("prompt is required")),
    };

    Ok(EmbeddingsRequest {
        model,
        input,
        dimensions: request.options.and_then(|o| o.dimensions),
    })
}

/// Shape the upstream vectors like the inbound prompt: one vector for a
/// string, a list of vectors for a list.
pub fn transform_embedding_response(
    response: EmbeddingsResponse,
    batch: bool,
) -> Result<EmbeddingResponse, GatewayError> {
    let mut data = response.data;
    data.sort_by_key(|d| d.index);
    let mut vectors = data.into_iter().map(|d| d.embedding);

    let embedding = if batch {
        EmbeddingOutput::Batch(vectors.collect())
    } else {
        EmbeddingOutput::Single(vectors.next().ok_or_else(|| {
            GatewayError::InvalidUpstreamResponse {
                message: "upstream returned no embedding".to_string(),
            }
        })?)
    };
    Ok(EmbeddingResponse { embedding })
}
