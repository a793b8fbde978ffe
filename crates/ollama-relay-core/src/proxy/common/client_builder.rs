use ollama_relay_types::UpstreamConfig;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the upstream HTTP client with optional outbound proxy.
///
/// `request_timeout_secs` is applied as an idle timeout: a read that waits
/// longer than that fails, but a stream that keeps delivering chunks may run
/// for as long as it needs. The whole-request deadline for buffered calls is
/// set per request by [`UpstreamClient`](crate::proxy::upstream::client::UpstreamClient).
pub fn build_http_client(upstream: &UpstreamConfig) -> Result<reqwest::Client, String> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(upstream.request_timeout())
        .tcp_nodelay(true);

    if let Some(url) = upstream.proxy_url.as_deref().filter(|u| !u.is_empty()) {
        let proxy =
            reqwest::Proxy::all(url).map_err(|e| format!("Invalid upstream proxy url: {}", e))?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(|e| format!("Failed to build HTTP client: {}", e))
}
