//! Per-request clock used to fabricate Ollama's timing fields.

use chrono::{SecondsFormat, Utc};
use ollama_relay_types::protocol::ollama::GenerationMetrics;
use std::time::{Duration, Instant};

/// RFC 3339 UTC timestamp for `created_at` / `modified_at`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Marks the points of a request's life that Ollama reports on.
///
/// Start the clock right before the upstream call is issued.
#[derive(Debug, Clone, Copy)]
pub struct RequestClock {
    dispatched_at: Instant,
    headers_at: Option<Instant>,
    first_delta_at: Option<Instant>,
}

impl RequestClock {
    pub fn start() -> Self {
        Self { dispatched_at: Instant::now(), headers_at: None, first_delta_at: None }
    }

    /// Upstream response headers arrived.
    pub fn mark_headers(&mut self) {
        self.headers_at.get_or_insert_with(Instant::now);
    }

    /// First content delta arrived. Later calls are no-ops.
    pub fn mark_first_delta(&mut self) {
        self.first_delta_at.get_or_insert_with(Instant::now);
    }

    /// Metrics for a streamed response, ending now.
    pub fn streaming_metrics(&self, prompt_eval_count: u64, eval_count: u64) -> GenerationMetrics {
        let end = Instant::now();
        let headers_at = self.headers_at.unwrap_or(end);
        let (prompt_eval_duration, eval_duration) = match self.first_delta_at {
            Some(first) => (
                first.saturating_duration_since(headers_at),
                end.saturating_duration_since(first),
            ),
            None => (end.saturating_duration_since(headers_at), Duration::ZERO),
        };

        GenerationMetrics {
            total_duration: nanos(end.saturating_duration_since(self.dispatched_at)),
            load_duration: nanos(headers_at.saturating_duration_since(self.dispatched_at)),
            prompt_eval_count,
            prompt_eval_duration: nanos(prompt_eval_duration),
            eval_count,
            eval_duration: nanos(eval_duration),
        }
    }

    /// Metrics for a buffered (non-streaming) response, ending now.
    pub fn buffered_metrics(&self, prompt_eval_count: u64, eval_count: u64) -> GenerationMetrics {
        let end = Instant::now();
        let headers_at = self.headers_at.unwrap_or(end);

        GenerationMetrics {
            total_duration: nanos(end.saturating_duration_since(self.dispatched_at)),
            load_duration: nanos(headers_at.saturating_duration_since(self.dispatched_at)),
            prompt_eval_count,
            prompt_eval_duration: 0,
            eval_count,
            eval_duration: nanos(end.saturating_duration_since(headers_at)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_rfc3339() {
        let ts = timestamp_now();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok(), "bad timestamp {}", ts);
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn test_streaming_metrics_are_consistent() {
        let mut clock = RequestClock::start();
        std::thread::sleep(Duration::from_millis(2));
        clock.mark_headers();
        std::thread::sleep(Duration::from_millis(2));
        clock.mark_first_delta();
        std::thread::sleep(Duration::from_millis(2));

        let metrics = clock.streaming_metrics(3, 5);
        assert_eq!(metrics.prompt_eval_count, 3);
        assert_eq!(metrics.eval_count, 5);
        assert!(metrics.load_duration > 0);
        assert!(metrics.prompt_eval_duration > 0);
        assert!(metrics.eval_duration > 0);
        assert!(
            metrics.total_duration
                >= metrics.load_duration + metrics.prompt_eval_duration + metrics.eval_duration
        );
    }

    #[test]
    fn test_first_delta_mark_is_sticky() {
        let mut clock = RequestClock::start();
        clock.mark_headers();
        clock.mark_first_delta();
        let first = clock.first_delta_at;
        std::thread::sleep(Duration::from_millis(1));
        clock.mark_first_delta();
        assert_eq!(clock.first_delta_at, first);
    }

    #[test]
    fn test_buffered_metrics_without_headers_mark() {
        let clock = RequestClock::start();
        std::thread::sleep(Duration::from_millis(1));
        let metrics = clock.buffered_metrics(1, 1);
        assert!(metrics.total_duration > 0);
        assert_eq!(metrics.prompt_eval_duration, 0);
    }
}
