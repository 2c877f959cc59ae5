pub mod config;
pub mod error;
pub mod model;
pub mod supabase;
pub mod web;

use reqwest::Client;

use config::Config;
use model::CompletionClient;
use supabase::{ChatbotStore, IdentityDelegate, Supabase};

// App state structure
pub struct AppState {
    pub completions: CompletionClient,
    pub identity: IdentityDelegate,
    pub chatbots: ChatbotStore,
}

impl AppState {
    /// Wires every service client onto one shared outbound connection pool.
    pub fn new(config: &Config, client: Client) -> Self {
        let supabase = Supabase::new(client.clone(), config.supabase.clone());
        Self {
            completions: CompletionClient::new(client, config.provider.clone()),
            identity: IdentityDelegate::new(supabase.clone()),
            chatbots: ChatbotStore::new(supabase),
        }
    }
}
