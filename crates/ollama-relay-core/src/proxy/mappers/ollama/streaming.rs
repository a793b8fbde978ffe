//! OpenAI SSE → Ollama NDJSON.
//!
//! [`StreamReframer`] is the pure state machine: feed it SSE lines, get back
//! Ollama records. [`create_ollama_ndjson_stream`] drives it over the raw
//! upstream byte stream and frames each record as one JSON line.

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::pin::Pin;
use tracing::{debug, warn};

use ollama_relay_types::protocol::ollama::{OllamaResponse, ResponseShape};
use ollama_relay_types::protocol::openai::ChatCompletionChunk;
use ollama_relay_types::GatewayError;

use crate::proxy::common::{approximate_token_count, timestamp_now, RequestClock};

/// Single-pass transducer from upstream chunks to Ollama records.
///
/// Emits one `done: false` record per non-empty content delta, then exactly
/// one `done: true` record. Anything fed after that is ignored.
#[derive(Debug)]
pub struct StreamReframer {
    shape: ResponseShape,
    model: String,
    clock: RequestClock,
    prompt_eval_count: u64,
    completion: String,
    finish_reason: Option<String>,
    finished: bool,
}

impl StreamReframer {
    pub fn new(
        shape: ResponseShape,
        model: impl Into<String>,
        clock: RequestClock,
        prompt_eval_count: u64,
    ) -> Self {
        Self {
            shape,
            model: model.into(),
            clock,
            prompt_eval_count,
            completion: String::new(),
            finish_reason: None,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Full text emitted so far.
    pub fn completion(&self) -> &str {
        &self.completion
    }

    /// Consume one SSE line (without its trailing newline).
    pub fn push_line(&mut self, line: &str) -> Vec<OllamaResponse> {
        if self.finished {
            return Vec::new();
        }
        // Blank separators, comments and `event:` lines carry nothing for us.
        let Some(data) = line.trim().strip_prefix("data:") else {
            return Vec::new();
        };
        let data = data.trim();
        if data == "[DONE]" {
            return self.finish().into_iter().collect();
        }

        let chunk = match serde_json::from_str::<ChatCompletionChunk>(data) {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!("[Ollama-NDJSON] Skipping unparseable chunk: {}", e);
                return Vec::new();
            },
        };

        if let Some(error) = chunk.error {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return self
                .finish_interrupted(&GatewayError::StreamInterrupted { message })
                .into_iter()
                .collect();
        }

        let mut records = Vec::new();
        for choice in chunk.choices.into_iter().filter(|c| c.index == 0) {
            if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
                self.clock.mark_first_delta();
                self.completion.push_str(&text);
                records.push(OllamaResponse::delta(self.shape, &self.model, timestamp_now(), text));
            }
            if let Some(reason) = choice.finish_reason {
                self.finish_reason = Some(reason);
            }
        }

        if self.finish_reason.is_some() {
            records.extend(self.finish());
        }
        records
    }

    /// Terminal signal seen: produce the final record once.
    pub fn finish(&mut self) -> Option<OllamaResponse> {
        if self.finished {
            return None;
        }
        self.finished = true;
        let metrics = self
            .clock
            .streaming_metrics(self.prompt_eval_count, approximate_token_count(&self.completion));
        Some(OllamaResponse::finished(
            self.shape,
            &self.model,
            timestamp_now(),
            String::new(),
            metrics,
            Some(self.finish_reason.clone().unwrap_or_else(|| "stop".to_string())),
        ))
    }

    /// Upstream went away without a terminal signal. The final record still
    /// closes the stream for the client, carrying `error` instead of a reason.
    pub fn finish_interrupted(&mut self, error: &GatewayError) -> Option<OllamaResponse> {
        if self.finished {
            return None;
        }
        self.finished = true;
        let metrics = self
            .clock
            .streaming_metrics(self.prompt_eval_count, approximate_token_count(&self.completion));
        let mut record = OllamaResponse::finished(
            self.shape,
            &self.model,
            timestamp_now(),
            String::new(),
            metrics,
            None,
        );
        record.error = Some(error.to_string());
        Some(record)
    }
}

fn encode(record: &OllamaResponse) -> Result<Bytes, String> {
    let mut line = serde_json::to_vec(record).map_err(|e| e.to_string())?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}

/// Logs when the client goes away before the final record was produced.
/// Dropping the generator also drops the upstream body, which aborts the
/// upstream request.
struct DisconnectGuard {
    trace_id: String,
    completed: bool,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if !self.completed {
            warn!("[{}] Client disconnected mid-stream, upstream request cancelled", self.trace_id);
        }
    }
}

/// Reframe an upstream SSE body into Ollama NDJSON.
///
/// The returned stream always ends with exactly one `done: true` line, even
/// when the upstream fails or closes early.
pub fn create_ollama_ndjson_stream<S, E>(
    upstream: S,
    mut reframer: StreamReframer,
    trace_id: String,
) -> Pin<Box<dyn Stream<Item = Result<Bytes, String>> + Send>>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut guard = DisconnectGuard { trace_id, completed: false };
        let mut upstream = Box::pin(upstream);
        let mut buffer = BytesMut::new();

        'read: while let Some(item) = upstream.next().await {
            match item {
                Ok(bytes) => {
                    debug!("[Ollama-NDJSON] Received chunk: {} bytes", bytes.len());
                    buffer.extend_from_slice(&bytes);

                    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                        let line_raw = buffer.split_to(pos + 1);
                        let Ok(line) = std::str::from_utf8(&line_raw) else {
                            debug!("[Ollama-NDJSON] Skipping non UTF-8 line");
                            continue;
                        };
                        for record in reframer.push_line(line) {
                            yield encode(&record);
                        }
                        if reframer.is_finished() {
                            break 'read;
                        }
                    }
                },
                Err(e) => {
                    warn!("[{}] Upstream stream error: {}", guard.trace_id, e);
                    let error = GatewayError::StreamInterrupted { message: e.to_string() };
                    if let Some(record) = reframer.finish_interrupted(&error) {
                        yield encode(&record);
                    }
                    break 'read;
                },
            }
        }

        if !reframer.is_finished() {
            // Upstream closed; a last line may lack its newline.
            if let Ok(rest) = std::str::from_utf8(&buffer) {
                for record in reframer.push_line(rest) {
                    yield encode(&record);
                }
            }
        }
        if !reframer.is_finished() {
            warn!("[{}] Upstream closed without a terminal signal", guard.trace_id);
            let error = GatewayError::StreamInterrupted {
                message: "connection closed before completion".to_string(),
            };
            if let Some(record) = reframer.finish_interrupted(&error) {
                yield encode(&record);
            }
        }

        drop(upstream);
        guard.completed = true;
    };

    Box::pin(stream)
}
