//! LLM Provider implementations for dealflow.
//!
//! All providers implement the `dealflow_core::Provider` trait. The agent
//! loop never sees which backend it is talking to.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use dealflow_config::AppConfig;
use std::sync::Arc;

/// Build the provider configured for this deployment.
pub fn from_config(config: &AppConfig) -> Arc<dyn dealflow_core::Provider> {
    Arc::new(OpenAiCompatProvider::new(
        "openai",
        &config.provider.api_url,
        config.provider.api_key.clone().unwrap_or_default(),
    ))
}
