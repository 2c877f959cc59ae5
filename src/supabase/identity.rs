use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{send_json, Supabase};
use crate::error::GatewayError;
use crate::web::models::Credentials;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Registration, login and token checks against Supabase Auth.
#[derive(Clone)]
pub struct IdentityDelegate {
    supabase: Supabase,
}

impl IdentityDelegate {
    pub fn new(supabase: Supabase) -> Self {
        Self { supabase }
    }

    pub async fn register(&self, credentials: Credentials) -> Result<Value, GatewayError> {
        let credentials = credentials.normalized()?;
        let request = self
            .supabase
            .service_post("/auth/v1/signup")?
            .json(&json!({ "email": credentials.email, "password": credentials.password }));

        let body = send_json(request, "auth service").await?;
        info!("registered a new user");
        debug!("registered {}", credentials.email);
        Ok(body)
    }

    pub async fn login(&self, credentials: Credentials) -> Result<Value, GatewayError> {
        let credentials = credentials.normalized()?;
        let request = self
            .supabase
            .service_post("/auth/v1/token?grant_type=password")?
            .json(&json!({ "email": credentials.email, "password": credentials.password }));

        let body = send_json(request, "auth service").await?;
        debug!("login for {}", credentials.email);
        Ok(body)
    }

    /// Resolves an access token to the user it was issued for.
    pub async fn verify(&self, token: &str) -> Result<UserIdentity, GatewayError> {
        if token.trim().is_empty() {
            return Err(GatewayError::Unauthorized("missing access token".into()));
        }

        let request = self.supabase.get("/auth/v1/user")?.bearer_auth(token);
        let body = send_json(request, "auth service")
            .await
            .map_err(|e| match e {
                GatewayError::Delegate { status: 401 | 403, .. } => {
                    warn!("rejected access token");
                    GatewayError::Unauthorized("invalid or expired token".into())
                }
                other => other,
            })?;

        serde_json::from_value(body)
            .map_err(|e| GatewayError::UpstreamProtocol(format!("user payload: {e}")))
    }
}
