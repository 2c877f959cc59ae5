use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{send_json, Supabase};
use crate::error::GatewayError;
use crate::web::models::ChatbotConfig;

const TABLE: &str = "/rest/v1/chatbots";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatbotSettings {
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// A row of the `chatbots` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatbotRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub config: Option<ChatbotSettings>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone)]
pub struct ChatbotStore {
    supabase: Supabase,
}

impl ChatbotStore {
    pub fn new(supabase: Supabase) -> Self {
        Self { supabase }
    }

    pub async fn create_chatbot(
        &self,
        user_id: &str,
        config: &ChatbotConfig,
    ) -> Result<ChatbotRecord, GatewayError> {
        config.validate()?;

        let request = self
            .supabase
            .service_post(TABLE)?
            .header("Prefer", "return=representation")
            .json(&json!({
                "user_id": user_id,
                "name": config.name.trim(),
                "description": config.description,
                "config": {
                    "instructions": config.instructions,
                    "color": config.color,
                    "temperature": config.temperature,
                }
            }));

        let record = first_row(send_json(request, "data store").await?)?
            .ok_or_else(|| GatewayError::UpstreamProtocol("insert returned no row".into()))?;
        info!("created chatbot {} for user {}", record.id, user_id);
        Ok(record)
    }

    pub async fn get_chatbot(&self, id: &str) -> Result<ChatbotRecord, GatewayError> {
        let request = self
            .supabase
            .service_get(TABLE)?
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_string())]);

        first_row(send_json(request, "data store").await?)?
            .ok_or_else(|| GatewayError::NotFound(format!("chatbot {id} not found")))
    }

    pub async fn list_chatbots(&self, user_id: &str) -> Result<Vec<ChatbotRecord>, GatewayError> {
        let request = self.supabase.service_get(TABLE)?.query(&[
            ("user_id", format!("eq.{user_id}")),
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ]);

        rows(send_json(request, "data store").await?)
    }
}

fn rows(body: Value) -> Result<Vec<ChatbotRecord>, GatewayError> {
    serde_json::from_value(body)
        .map_err(|e| GatewayError::UpstreamProtocol(format!("chatbot rows: {e}")))
}

fn first_row(body: Value) -> Result<Option<ChatbotRecord>, GatewayError> {
    Ok(rows(body)?.into_iter().next())
}
