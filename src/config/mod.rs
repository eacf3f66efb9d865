//! Application configuration

use std::env;
use std::path::PathBuf;

use anyhow::Context;

/// Origins allowed to call the API from a browser when `ALLOWED_ORIGINS`
/// is not set: the usual local dev servers for the site frontend.
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:4321",
    "http://localhost:3000",
    "http://localhost:5173",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model: String,
    pub temperature: f32,
    pub pushover_token: Option<String>,
    pub pushover_user: Option<String>,
    pub persona_dir: PathBuf,
    pub persona_name: Option<String>,
    pub persona_summary: Option<String>,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            openai_api_key: env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY is not set")?,
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            temperature: env::var("OPENAI_TEMPERATURE")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.7),
            pushover_token: env::var("PUSHOVER_TOKEN").ok(),
            pushover_user: env::var("PUSHOVER_USER").ok(),
            persona_dir: env::var("PERSONA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("me")),
            persona_name: env::var("PERSONA_NAME").ok(),
            persona_summary: env::var("PERSONA_SUMMARY").ok(),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_else(|_| {
                    DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect()
                }),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_list_splits_and_trims() {
        let origins = parse_origins("https://example.github.io, http://localhost:4321 ,");
        assert_eq!(
            origins,
            vec!["https://example.github.io", "http://localhost:4321"]
        );
    }
}
