//! Chat-completion client with serialized admission and rate-limit retry.
//!
//! Calls are admitted strictly one at a time through an instance-owned
//! tokio mutex (FIFO-fair, so queued calls complete in submission order).
//! Rate-limit responses retry with the service's `Retry-After` hint when
//! present, otherwise exponential backoff from 1s, always plus 0-250ms of
//! jitter. No other failure is retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::credentials::Credentials;
use crate::error::GenerationError;

/// Default chat-completion endpoint.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model for analysis calls.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are a legal analysis expert specializing in \
consumer protection. Provide responses in valid JSON format only.";

/// Wire shape of a chat-completion request.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatRequest {
    /// Two-message exchange: fixed system persona plus the built prompt.
    /// Temperature pinned low, output tokens bounded.
    pub fn analysis(model: &str, prompt: &str) -> Self {
        ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature: 0.3,
            max_tokens: 1000,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// One exchange with the generation service, mockable for tests.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send the request and return the assistant's raw text content.
    async fn send(&self, request: &ChatRequest, api_key: &str)
    -> Result<String, GenerationError>;
}

/// reqwest-backed transport mapping HTTP statuses to the typed taxonomy.
pub struct HttpChatTransport {
    client: reqwest::Client,
    api_url: String,
}

impl HttpChatTransport {
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }
}

impl Default for HttpChatTransport {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL.to_string())
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(
        &self,
        request: &ChatRequest,
        api_key: &str,
    ) -> Result<String, GenerationError> {
        info!(model = %request.model, "calling generation service");
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let retry_after_ms = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(|secs| secs * 1000);
            let body: ErrorBody = resp.json().await.unwrap_or_default();
            let message = body
                .error
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Unknown error".to_string());

            return Err(match status.as_u16() {
                401 => GenerationError::InvalidCredential,
                429 => GenerationError::RateLimited { retry_after_ms },
                404 | 403 => GenerationError::ModelUnavailable {
                    model: request.model.clone(),
                },
                400 => GenerationError::MalformedRequest(message),
                code => GenerationError::Service {
                    status: code,
                    message,
                },
            });
        }

        let data: ChatResponse = resp.json().await?;
        data.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(GenerationError::Service {
                status: status.as_u16(),
                message: "response contained no choices".to_string(),
            })
    }
}

/// Retry policy for rate-limit failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            base_delay_ms: 1000,
            max_jitter_ms: 250,
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following `attempt` (1-based).
    ///
    /// Uses the service hint when present, else `base x 2^(attempt-1)`;
    /// jitter is added either way to avoid thundering-herd resubmission.
    pub fn delay_ms(&self, attempt: u32, hint_ms: Option<u64>) -> u64 {
        let base = hint_ms
            .filter(|ms| *ms > 0)
            .unwrap_or_else(|| self.base_delay_ms << (attempt - 1));
        base + self.jitter_ms()
    }

    fn jitter_ms(&self) -> u64 {
        if self.max_jitter_ms == 0 {
            0
        } else {
            rand::random_range(0..self.max_jitter_ms)
        }
    }
}

/// Serialized, retrying front door to the generation service.
pub struct GenerationClient {
    transport: Arc<dyn ChatTransport>,
    credentials: Credentials,
    model: String,
    retry: RetryPolicy,
    /// Admission gate: at most one request in flight, FIFO order.
    gate: Mutex<()>,
}

impl GenerationClient {
    /// Client against the real endpoint with default model and retry policy.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_transport(
            Arc::new(HttpChatTransport::default()),
            credentials,
            RetryPolicy::default(),
        )
    }

    pub fn with_transport(
        transport: Arc<dyn ChatTransport>,
        credentials: Credentials,
        retry: RetryPolicy,
    ) -> Self {
        GenerationClient {
            transport,
            credentials,
            model: DEFAULT_MODEL.to_string(),
            retry,
            gate: Mutex::new(()),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Whether a usable API key is currently available.
    pub fn is_configured(&self) -> bool {
        self.credentials.is_configured()
    }

    /// Obtain one raw text response for `prompt`.
    ///
    /// Queued behind any in-flight call; the next queued call dispatches
    /// only after this one resolves, success or exhausted failure.
    pub async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .credentials
            .resolve()
            .ok_or(GenerationError::NotConfigured)?;
        let request = ChatRequest::analysis(&self.model, prompt);

        let _slot = self.gate.lock().await;
        self.send_with_retry(&request, &api_key).await
    }

    async fn send_with_retry(
        &self,
        request: &ChatRequest,
        api_key: &str,
    ) -> Result<String, GenerationError> {
        let max = self.retry.max_attempts;
        for attempt in 1..=max {
            match self.transport.send(request, api_key).await {
                Ok(text) => return Ok(text),
                Err(GenerationError::RateLimited { retry_after_ms }) => {
                    if attempt == max {
                        warn!(attempts = max, "rate limits persist after all retries");
                        return Err(GenerationError::RateLimitExhausted { attempts: max });
                    }
                    let delay = self.retry.delay_ms(attempt, retry_after_ms);
                    warn!(attempt, max, delay_ms = delay, "rate limit hit, retrying");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(err) => return Err(err),
            }
        }
        Err(GenerationError::RateLimitExhausted { attempts: max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Transport that fails `failures` times with a rate limit, then succeeds.
    struct RateLimitedTransport {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ChatTransport for RateLimitedTransport {
        async fn send(&self, _: &ChatRequest, _: &str) -> Result<String, GenerationError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(GenerationError::RateLimited {
                    retry_after_ms: None,
                })
            } else {
                Ok("{}".to_string())
            }
        }
    }

    struct InvalidKeyTransport {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ChatTransport for InvalidKeyTransport {
        async fn send(&self, _: &ChatRequest, _: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GenerationError::InvalidCredential)
        }
    }

    /// Transport that records the peak number of concurrent sends and the
    /// order prompts were dispatched in.
    struct RecordingTransport {
        in_flight: AtomicU32,
        peak: AtomicU32,
        order: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn send(&self, req: &ChatRequest, _: &str) -> Result<String, GenerationError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.order
                .lock()
                .unwrap()
                .push(req.messages[1].content.clone());
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok("{}".to_string())
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            base_delay_ms: 1,
            max_jitter_ms: 0,
        }
    }

    fn client_with(transport: Arc<dyn ChatTransport>) -> GenerationClient {
        GenerationClient::with_transport(transport, Credentials::fixed("sk-test"), fast_retry())
    }

    #[test]
    fn delay_uses_exponential_backoff() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay_ms: 1000,
            max_jitter_ms: 0,
        };
        assert_eq!(policy.delay_ms(1, None), 1000);
        assert_eq!(policy.delay_ms(2, None), 2000);
        assert_eq!(policy.delay_ms(4, None), 8000);
    }

    #[test]
    fn delay_prefers_service_hint() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay_ms: 1000,
            max_jitter_ms: 0,
        };
        assert_eq!(policy.delay_ms(1, Some(7000)), 7000);
        // Zero hint is ignored.
        assert_eq!(policy.delay_ms(2, Some(0)), 2000);
    }

    #[test]
    fn delay_jitter_stays_in_range() {
        let policy = RetryPolicy::default();
        for _ in 0..100 {
            let d = policy.delay_ms(1, None);
            assert!((1000..1250).contains(&d), "delay {d} out of range");
        }
    }

    #[tokio::test]
    async fn persistent_rate_limit_exhausts_after_five_attempts() {
        let transport = Arc::new(RateLimitedTransport {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
        });
        let client = client_with(transport.clone());

        let err = client.complete("p").await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::RateLimitExhausted { attempts: 5 }
        ));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn transient_rate_limit_recovers() {
        let transport = Arc::new(RateLimitedTransport {
            failures: 2,
            calls: AtomicU32::new(0),
        });
        let client = client_with(transport.clone());

        let out = client.complete("p").await.unwrap();
        assert_eq!(out, "{}");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn invalid_credential_is_not_retried() {
        let transport = Arc::new(InvalidKeyTransport {
            calls: AtomicU32::new(0),
        });
        let client = client_with(transport.clone());

        let err = client.complete("p").await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidCredential));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_call() {
        let transport = Arc::new(RecordingTransport {
            in_flight: AtomicU32::new(0),
            peak: AtomicU32::new(0),
            order: std::sync::Mutex::new(Vec::new()),
        });
        let client = GenerationClient::with_transport(
            transport.clone(),
            Credentials::fixed(crate::credentials::KEY_PLACEHOLDER),
            fast_retry(),
        );

        let err = client.complete("p").await.unwrap_err();
        assert!(matches!(err, GenerationError::NotConfigured));
        assert!(transport.order.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_calls_are_serialized_in_order() {
        let transport = Arc::new(RecordingTransport {
            in_flight: AtomicU32::new(0),
            peak: AtomicU32::new(0),
            order: std::sync::Mutex::new(Vec::new()),
        });
        let client = client_with(transport.clone());

        // join_all polls the futures in index order, so the mutex queue
        // forms in submission order.
        let prompts = ["p0", "p1", "p2", "p3"];
        let results =
            futures::future::join_all(prompts.iter().map(|p| client.complete(p))).await;
        for r in results {
            r.unwrap();
        }

        assert_eq!(transport.peak.load(Ordering::SeqCst), 1, "overlapping calls");
        let order = transport.order.lock().unwrap();
        let dispatched: Vec<&str> = order.iter().map(String::as_str).collect();
        assert_eq!(dispatched, prompts);
    }
}
