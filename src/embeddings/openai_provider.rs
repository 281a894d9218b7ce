use anyhow::{anyhow, Context, Result};
use async_openai::{
    config::OpenAIConfig as AsyncOpenAIConfig, types::CreateEmbeddingRequestArgs, Client,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::provider::EmbeddingProvider;
use crate::config::EmbeddingsConfig;
use crate::metrics::{EMBEDDING_LATENCY, EMBEDDING_REQUESTS};

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1000;
const MAX_BACKOFF_MS: u64 = 60_000;
const EXPONENTIAL_BASE: f64 = 2.0;

/// Rate limiter for API calls
struct RateLimiter {
    tokens: Arc<RwLock<f64>>,
    max_tokens: f64,
    refill_rate: f64,
    last_refill: Arc<RwLock<Instant>>,
}

impl RateLimiter {
    fn new(max_tokens: f64, refill_rate: f64) -> Self {
        Self {
            tokens: Arc::new(RwLock::new(max_tokens)),
            max_tokens,
            refill_rate,
            last_refill: Arc::new(RwLock::new(Instant::now())),
        }
    }

    async fn acquire(&self, count: usize) -> Result<()> {
        loop {
            let mut tokens = self.tokens.write().await;
            let mut last_refill = self.last_refill.write().await;

            // Refill tokens
            let elapsed = last_refill.elapsed().as_secs_f64();
            *tokens = (*tokens + elapsed * self.refill_rate).min(self.max_tokens);
            *last_refill = Instant::now();

            if *tokens >= count as f64 {
                *tokens -= count as f64;
                return Ok(());
            }

            // Wait for tokens
            let wait_time = ((count as f64 - *tokens) / self.refill_rate) * 1000.0;
            drop(tokens);
            drop(last_refill);

            tokio::time::sleep(Duration::from_millis(wait_time as u64)).await;
        }
    }
}

/// OpenAI embedding provider implementation.
pub struct OpenAIProvider {
    client: Client<AsyncOpenAIConfig>,
    model: String,
    rate_limiter: Arc<RateLimiter>,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider.
    ///
    /// The API key comes from the config when set, otherwise from the
    /// `OPENAI_API_KEY` environment variable.
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let api_key = match &config.openai_api_key {
            Some(key) if !key.is_empty() => key.clone(),
            _ => std::env::var("OPENAI_API_KEY")
                .context("OpenAI provider selected but no API key configured")?,
        };

        let mut openai_config = AsyncOpenAIConfig::new().with_api_key(api_key);

        if let Some(base_url) = &config.openai_base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        let client = Client::with_config(openai_config);

        // Rate limiter: 3500 requests per minute
        let rate_limiter = Arc::new(RateLimiter::new(3500.0, 3500.0 / 60.0));

        info!(
            "Initialized OpenAI provider with model: {}",
            config.openai_model
        );

        Ok(Self {
            client,
            model: config.openai_model.clone(),
            rate_limiter,
        })
    }

    /// Retry with exponential backoff
    async fn retry_with_backoff<F, Fut, T>(&self, f: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        let mut backoff = INITIAL_BACKOFF_MS;

        loop {
            match f().await {
                Ok(result) => return Ok(result),
                Err(e) if attempt >= MAX_RETRIES => {
                    return Err(e).context("Max retries exceeded");
                }
                Err(e) => {
                    warn!("OpenAI request failed (attempt {}): {}", attempt + 1, e);
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                    backoff = (backoff as f64 * EXPONENTIAL_BASE) as u64;
                    backoff = backoff.min(MAX_BACKOFF_MS);
                    attempt += 1;
                }
            }
        }
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        EMBEDDING_REQUESTS.inc();
        let start = Instant::now();

        self.rate_limiter.acquire(1).await?;

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(vec![text.to_string()])
            .build()
            .context("Failed to build OpenAI request")?;

        let response = self
            .retry_with_backoff(|| async {
                self.client
                    .embeddings()
                    .create(request.clone())
                    .await
                    .context("OpenAI API request failed")
            })
            .await?;

        EMBEDDING_LATENCY.observe(start.elapsed().as_secs_f64());

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| anyhow!("No embedding returned"))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_one(text).await
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embed_one(query).await
    }

    fn dimension(&self) -> usize {
        openai_dimension(&self.model)
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

/// Embedding dimension for an OpenAI model, resolvable without a client.
pub fn openai_dimension(model_name: &str) -> usize {
    match model_name {
        "text-embedding-3-small" => 1536,
        "text-embedding-3-large" => 3072,
        "text-embedding-ada-002" => 1536,
        _ => 1536, // Default
    }
}
