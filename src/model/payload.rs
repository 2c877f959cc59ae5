//! Wire structures for the OpenAI-compatible chat completion endpoint.

use serde::{Deserialize, Serialize};

use crate::web::models::{ChatMessage, Role};

#[derive(Debug, Serialize)]
pub struct UpstreamRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<UpstreamMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct UpstreamMessage<'a> {
    pub role: Role,
    pub content: &'a str,
}

impl<'a> UpstreamRequest<'a> {
    /// Puts the instructions first as a system message, unless they are blank,
    /// then the conversation in caller order.
    pub fn build(
        model: &'a str,
        instructions: &'a str,
        messages: &'a [ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        if !instructions.trim().is_empty() {
            wire.push(UpstreamMessage {
                role: Role::System,
                content: instructions,
            });
        }
        wire.extend(messages.iter().map(|m| UpstreamMessage {
            role: m.role,
            content: &m.content,
        }));

        Self {
            model,
            messages: wire,
            temperature,
            max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpstreamResponse {
    pub choices: Vec<UpstreamChoice>,
    #[serde(default)]
    pub usage: Option<UpstreamUsage>,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamChoice {
    pub message: UpstreamReply,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamReply {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamUsage {
    #[serde(default)]
    pub total_tokens: Option<u32>,
}
