use serde::{Deserialize, Deserializer, Serialize};

use crate::error::GatewayError;

pub const DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const MAX_INSTRUCTIONS_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "system")]
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl ChatRequest {
    /// Rejects requests that must never reach the provider.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.messages.is_empty() {
            return Err(GatewayError::Validation(
                "messages must contain at least one message".into(),
            ));
        }
        if let Some(idx) = self
            .messages
            .iter()
            .position(|m| m.content.trim().is_empty())
        {
            return Err(GatewayError::Validation(format!(
                "messages[{idx}].content must not be empty"
            )));
        }
        check_max_chars("instructions", &self.instructions, MAX_INSTRUCTIONS_CHARS)?;
        if self.model.trim().is_empty() {
            return Err(GatewayError::Validation("model must not be empty".into()));
        }
        check_temperature(self.temperature)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub model_used: String,
    pub tokens_used: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Trims and lower-cases the email and checks both fields are present.
    pub fn normalized(self) -> Result<Self, GatewayError> {
        let email = self.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(GatewayError::Validation("a valid email is required".into()));
        }
        if self.password.is_empty() {
            return Err(GatewayError::Validation("password is required".into()));
        }
        Ok(Self {
            email,
            password: self.password,
        })
    }
}

/// Persona settings submitted by a signed-in user. The owner comes from the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotConfig {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub instructions: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

// Accepts an explicit `null` where an empty string is meant.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_color() -> String {
    "#00ffff".to_string()
}

impl ChatbotConfig {
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.name.trim().is_empty() {
            return Err(GatewayError::Validation("name must not be empty".into()));
        }
        check_max_chars("name", &self.name, 50)?;
        check_max_chars("description", &self.description, 500)?;
        check_max_chars("instructions", &self.instructions, MAX_INSTRUCTIONS_CHARS)?;
        check_max_chars("color", &self.color, 16)?;
        check_temperature(self.temperature)
    }
}

fn check_max_chars(field: &str, value: &str, max: usize) -> Result<(), GatewayError> {
    if value.chars().count() > max {
        return Err(GatewayError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn check_temperature(temperature: f32) -> Result<(), GatewayError> {
    if !(0.0..=1.0).contains(&temperature) {
        return Err(GatewayError::Validation(
            "temperature must be between 0 and 1".into(),
        ));
    }
    Ok(())
}
