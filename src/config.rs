use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    pub api_url: String,
    pub api_token: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub inference: InferenceConfig,
}

impl AppConfig {
    /// Reads configuration from the environment. Secrets have no fallback
    /// values: a missing DATABASE_URL, JWT_SECRET or INFERENCE_API_TOKEN
    /// aborts startup.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "codecritic".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "codecritic-users".into()),
            // Sessions last seven days.
            ttl_minutes: 7 * 24 * 60,
        };
        let inference = InferenceConfig {
            api_url: std::env::var("INFERENCE_API_URL")
                .unwrap_or_else(|_| "https://router.huggingface.co/v1/chat/completions".into()),
            api_token: std::env::var("INFERENCE_API_TOKEN")
                .context("INFERENCE_API_TOKEN is not set")?,
            model: std::env::var("INFERENCE_MODEL")
                .unwrap_or_else(|_| "Qwen/Qwen2.5-7B-Instruct".into()),
            max_tokens: 1200,
        };
        Ok(Self {
            database_url,
            jwt,
            inference,
        })
    }
}
