use actix_web::{http::header, web, HttpRequest, HttpResponse};
use log::{error, info, warn};
use serde_json::json;

use crate::error::GatewayError;
use crate::supabase::UserIdentity;
use crate::web::models::{ChatRequest, ChatbotConfig, Credentials};
use crate::AppState;

// Service banner
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "endpoints": [
            "GET /health",
            "POST /chatbot/message",
            "POST /register",
            "POST /login",
            "POST /save-data",
            "GET /chatbots",
            "GET /chatbots/{id}"
        ]
    }))
}

// Health check endpoint
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Chat relay endpoint
pub async fn chat(
    data: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, GatewayError> {
    let req = req.into_inner();
    req.validate().map_err(|e| {
        warn!("Rejected chat request: {}", e);
        e
    })?;

    let response = data
        .completions
        .complete(&req.messages, &req.instructions, &req.model, req.temperature)
        .await
        .map_err(|e| {
            match &e {
                GatewayError::Configuration(setting) => {
                    error!("Chat refused, {} is not configured", setting)
                }
                other => error!("Chat relay failed for model {}: {}", req.model, other),
            }
            e
        })?;

    Ok(HttpResponse::Ok().json(response))
}

pub async fn register(
    data: web::Data<AppState>,
    body: web::Json<Credentials>,
) -> Result<HttpResponse, GatewayError> {
    let created = data.identity.register(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(created))
}

pub async fn login(
    data: web::Data<AppState>,
    body: web::Json<Credentials>,
) -> Result<HttpResponse, GatewayError> {
    let session = data.identity.login(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session))
}

pub async fn save_data(
    data: web::Data<AppState>,
    http: HttpRequest,
    body: web::Json<ChatbotConfig>,
) -> Result<HttpResponse, GatewayError> {
    let user = authenticate(&data, &http).await?;
    let record = data.chatbots.create_chatbot(&user.id, &body).await?;
    Ok(HttpResponse::Created().json(record))
}

pub async fn list_chatbots(
    data: web::Data<AppState>,
    http: HttpRequest,
) -> Result<HttpResponse, GatewayError> {
    let user = authenticate(&data, &http).await?;
    let bots = data.chatbots.list_chatbots(&user.id).await?;
    Ok(HttpResponse::Ok().json(bots))
}

pub async fn get_chatbot(
    data: web::Data<AppState>,
    http: HttpRequest,
    id: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
    let user = authenticate(&data, &http).await?;
    let bot = data.chatbots.get_chatbot(&id).await?;

    // Other users' bots look the same as missing ones.
    if bot.user_id != user.id {
        info!("User {} asked for chatbot {} owned by someone else", user.id, bot.id);
        return Err(GatewayError::NotFound(format!("chatbot {} not found", id)));
    }
    Ok(HttpResponse::Ok().json(bot))
}

/// Returns the JSON extractor config that turns body errors into 400s.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        warn!("Malformed request body: {}", err);
        GatewayError::Validation(err.to_string()).into()
    })
}

async fn authenticate(data: &AppState, http: &HttpRequest) -> Result<UserIdentity, GatewayError> {
    let token = bearer_token(http)
        .ok_or_else(|| GatewayError::Unauthorized("missing bearer token".into()))?;
    data.identity.verify(token).await
}

fn bearer_token(http: &HttpRequest) -> Option<&str> {
    http.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
