pub mod payload;

use std::time::Instant;

use log::{debug, error, info, warn};
use reqwest::Client;
use uuid::Uuid;

use crate::config::ProviderConfig;
use crate::error::{truncate_body, GatewayError};
use crate::web::models::{ChatMessage, ChatResponse};

use payload::{UpstreamRequest, UpstreamResponse};

/// A wrapper for the chat completion provider's API.
///
/// Every call is a single attempt: no retries, and the shared `reqwest::Client`
/// enforces the configured timeout.
#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    config: ProviderConfig,
}

impl CompletionClient {
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        info!("Completion provider at: {}", config.base_url);
        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        instructions: &str,
        model: &str,
        temperature: f32,
    ) -> Result<ChatResponse, GatewayError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(GatewayError::Configuration("OPENROUTER_API_KEY"))?;

        let request_id = Uuid::new_v4();
        let payload = UpstreamRequest::build(
            model,
            instructions,
            messages,
            temperature,
            self.config.max_tokens,
        );

        info!(
            "[{}] completion request: model={} messages={} temperature={}",
            request_id,
            model,
            payload.messages.len(),
            temperature
        );
        debug!("[{}] payload: {:?}", request_id, payload);

        let started = Instant::now();
        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(api_key.expose())
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    "request timed out"
                } else if e.is_connect() {
                    "connection failed"
                } else {
                    "request failed"
                };
                warn!(
                    "[{}] provider unreachable after {:?}: {}",
                    request_id,
                    started.elapsed(),
                    e
                );
                GatewayError::UpstreamUnavailable(reason.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!("[{}] failed to read provider body: {}", request_id, e);
            GatewayError::UpstreamUnavailable("failed to read response".to_string())
        })?;

        if !status.is_success() {
            let body = truncate_body(&body);
            error!(
                "[{}] provider returned {} for model {}: {}",
                request_id,
                status.as_u16(),
                model,
                body
            );
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: UpstreamResponse = serde_json::from_str(&body).map_err(|e| {
            error!(
                "[{}] malformed provider response: {} body={}",
                request_id,
                e,
                truncate_body(&body)
            );
            GatewayError::UpstreamProtocol(e.to_string())
        })?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                error!("[{}] provider response had no completion choice", request_id);
                GatewayError::UpstreamProtocol("no completion choice".to_string())
            })?;

        let tokens_used = parsed.usage.and_then(|u| u.total_tokens);
        info!(
            "[{}] completion finished in {:?}: {} chars, tokens={:?}",
            request_id,
            started.elapsed(),
            reply.chars().count(),
            tokens_used
        );

        Ok(ChatResponse {
            reply,
            model_used: model.to_string(),
            tokens_used,
        })
    }
}
