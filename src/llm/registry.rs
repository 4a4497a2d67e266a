//! Model registry for the chat models the orchestrator talks to

use super::{LlmService, LoggingService, OpenAIService};
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_ROUTER_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GRAPHQL_MODEL: &str = "gpt-4.1-mini";

/// Configuration for LLM providers
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    /// Alternate OpenAI-compatible base URL (e.g. `https://proxy.example/v1`)
    pub base_url: Option<String>,
    /// Model used by the classifier, the weather agent and the fallback answer
    pub router_model: String,
    /// Model driving the GraphQL reasoning agent
    pub graphql_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            router_model: DEFAULT_ROUTER_MODEL.to_string(),
            graphql_model: DEFAULT_GRAPHQL_MODEL.to_string(),
        }
    }
}

/// Registry of available LLM models
///
/// Models are registered even without an API key; the key is checked when a
/// request is first made.
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    router_model: String,
    graphql_model: String,
}

impl ModelRegistry {
    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        for model_id in [&config.router_model, &config.graphql_model] {
            services.entry(model_id.clone()).or_insert_with(|| {
                let service = OpenAIService::new(
                    config.api_key.clone(),
                    model_id.clone(),
                    config.base_url.as_deref(),
                );
                tracing::debug!(model = %model_id, url = %service.url(), "Registered model");
                Arc::new(LoggingService::new(Arc::new(service)))
            });
        }

        if config.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set; LLM requests will fail until it is configured");
        }

        Self {
            services,
            router_model: config.router_model.clone(),
            graphql_model: config.graphql_model.clone(),
        }
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    /// Model for routing, weather answers and the fallback
    pub fn router(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.router_model)
    }

    /// Model for the GraphQL reasoning agent
    pub fn graphql(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.graphql_model)
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }
}
