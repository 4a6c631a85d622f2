//! Google Gemini API key validation.
//!
//! Checks a key by listing a single model from the Generative Language API. The call is
//! cheap, needs no request body, and is rejected with 400/401/403 when the key is bad.

use super::KeyValidator;
use crate::config::ValidatorConfig;
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;

/// Validator backed by the Gemini `models` endpoint.
pub struct GeminiValidator {
    client: reqwest::Client,
    models_url: String,
}

impl GeminiValidator {
    /// Builds a validator from the `[validator]` config section.
    ///
    /// # Errors
    /// - If the HTTP client cannot be constructed
    pub fn new(config: &ValidatorConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self::with_client(client, &config.endpoint))
    }

    fn with_client(client: reqwest::Client, endpoint: &str) -> Self {
        Self {
            client,
            models_url: format!("{}/v1beta/models?pageSize=1", endpoint.trim_end_matches('/')),
        }
    }
}

impl KeyValidator for GeminiValidator {
    fn validate(&self, key: &str) -> impl Future<Output = anyhow::Result<bool>> + Send {
        let client = self.client.clone();
        let url = self.models_url.clone();
        let key = key.to_string();

        async move {
            tracing::debug!(
                "Gemini API Call:\n  URL: {}\n  Method: GET\n  Headers:\n    x-goog-api-key: <redacted>",
                url
            );

            let response = match client.get(&url).header("x-goog-api-key", &key).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    let error_msg = if e.is_connect() {
                        "Failed to connect to Gemini API server. Check your internet connection."
                            .to_string()
                    } else if e.is_timeout() {
                        "Request to Gemini timed out. The API server is not responding.".to_string()
                    } else {
                        format!("Gemini network error: {e}")
                    };
                    return Err(anyhow::anyhow!(error_msg));
                }
            };

            let status = response.status();
            let verdict = classify_status(status);
            if verdict.is_err() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                tracing::debug!("Gemini API error body (status {status}): {body}");
            }
            verdict
        }
    }
}

/// Maps the provider's response status to a verdict on the key.
fn classify_status(status: StatusCode) -> anyhow::Result<bool> {
    if status.is_success() {
        return Ok(true);
    }

    match status.as_u16() {
        400 | 401 | 403 => Ok(false),
        429 => Err(anyhow::anyhow!(
            "Too many requests to Gemini. You've hit the API rate limit. Please wait and try again."
        )),
        500 | 502 | 503 | 504 => Err(anyhow::anyhow!(
            "Gemini API server is experiencing issues. Please try again later."
        )),
        _ => Err(anyhow::anyhow!("Gemini API error (status {status})")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP response and returns the raw request it received.
    async fn serve_once(status_line: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let body = "{}";
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&buf[..n]).to_string()
        });

        (endpoint, handle)
    }

    fn validator_for(endpoint: &str) -> GeminiValidator {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        GeminiValidator::with_client(client, endpoint)
    }

    #[test]
    fn test_models_url_from_config() {
        let validator = GeminiValidator::new(&ValidatorConfig::default()).unwrap();
        assert_eq!(
            validator.models_url,
            "https://generativelanguage.googleapis.com/v1beta/models?pageSize=1"
        );
    }

    #[test]
    fn test_classify_status() {
        assert!(classify_status(StatusCode::OK).unwrap());
        assert!(!classify_status(StatusCode::BAD_REQUEST).unwrap());
        assert!(!classify_status(StatusCode::UNAUTHORIZED).unwrap());
        assert!(!classify_status(StatusCode::FORBIDDEN).unwrap());
        assert!(classify_status(StatusCode::TOO_MANY_REQUESTS).is_err());
        assert!(classify_status(StatusCode::SERVICE_UNAVAILABLE).is_err());
        assert!(classify_status(StatusCode::IM_A_TEAPOT).is_err());
    }

    #[tokio::test]
    async fn test_accepted_key_sends_header() {
        let (endpoint, server) = serve_once("200 OK").await;
        let validator = validator_for(&format!("{endpoint}/"));

        assert!(validator.validate("AIza-good").await.unwrap());

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /v1beta/models?pageSize=1 "));
        assert!(request.to_lowercase().contains("x-goog-api-key: aiza-good"));
    }

    #[tokio::test]
    async fn test_rejected_key_is_invalid() {
        let (endpoint, server) = serve_once("400 Bad Request").await;
        let validator = validator_for(&endpoint);

        assert!(!validator.validate("AIza-bad").await.unwrap());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_is_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let validator = validator_for(&endpoint);
        assert!(validator.validate("AIza-any").await.is_err());
    }
}
