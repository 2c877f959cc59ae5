//! Thin clients for the Supabase project that owns users and chatbots.

pub mod identity;
pub mod store;

use log::{error, warn};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::config::{ApiKey, SupabaseConfig};
use crate::error::{truncate_body, GatewayError};

pub use identity::{IdentityDelegate, UserIdentity};
pub use store::{ChatbotRecord, ChatbotStore};

/// Shared connection details for the auth and REST APIs.
#[derive(Clone)]
pub struct Supabase {
    client: Client,
    url: Option<String>,
    api_key: Option<ApiKey>,
}

impl Supabase {
    pub fn new(client: Client, config: SupabaseConfig) -> Self {
        if config.url.is_none() || config.api_key.is_none() {
            warn!("SUPABASE_URL or SUPABASE_API_KEY not set; auth and chatbot endpoints disabled");
        }
        Self {
            client,
            url: config.url,
            api_key: config.api_key,
        }
    }

    fn endpoint(&self, path: &str) -> Result<(String, &ApiKey), GatewayError> {
        let url = self
            .url
            .as_deref()
            .ok_or(GatewayError::Configuration("SUPABASE_URL"))?;
        let key = self
            .api_key
            .as_ref()
            .ok_or(GatewayError::Configuration("SUPABASE_API_KEY"))?;
        Ok((format!("{url}{path}"), key))
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, GatewayError> {
        let (url, key) = self.endpoint(path)?;
        Ok(self.client.get(url).header("apikey", key.expose()))
    }

    // Authenticated with the service key rather than a user token.
    fn service_get(&self, path: &str) -> Result<RequestBuilder, GatewayError> {
        let (url, key) = self.endpoint(path)?;
        Ok(self
            .client
            .get(url)
            .header("apikey", key.expose())
            .bearer_auth(key.expose()))
    }

    fn service_post(&self, path: &str) -> Result<RequestBuilder, GatewayError> {
        let (url, key) = self.endpoint(path)?;
        Ok(self
            .client
            .post(url)
            .header("apikey", key.expose())
            .header("Content-Type", "application/json")
            .bearer_auth(key.expose()))
    }
}

/// Sends the request and returns the JSON body, or maps the failure.
async fn send_json(request: RequestBuilder, what: &str) -> Result<Value, GatewayError> {
    let response = request.send().await.map_err(|e| {
        warn!("{} call failed: {}", what, e);
        GatewayError::Delegate {
            status: 502,
            message: format!("{what} unavailable"),
        }
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        warn!("{} body unreadable after {}: {}", what, status.as_u16(), e);
        GatewayError::Delegate {
            status: 502,
            message: format!("{what} unavailable"),
        }
    })?;

    if !status.is_success() {
        warn!(
            "{} returned {}: {}",
            what,
            status.as_u16(),
            truncate_body(&body)
        );
        // Only rejections of the caller's own input are worth showing them.
        let message = if status.is_client_error() {
            extract_message(&body)
                .unwrap_or_else(|| format!("{what} returned {}", status.as_u16()))
        } else {
            format!("{what} unavailable")
        };
        return Err(GatewayError::Delegate {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        error!("{} sent malformed JSON: {}", what, e);
        GatewayError::UpstreamProtocol(e.to_string())
    })
}

/// Pulls a human readable message out of a Supabase error body.
fn extract_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|field| json.get(*field).and_then(Value::as_str))
        .map(str::to_string)
}
