//! Server configuration

use std::time::Duration;

use salu_core::{FlowContext, Keywords};

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    /// Postgres connection string; conversations are kept in memory when unset
    pub database_url: Option<String>,
    pub api_key: Option<String>,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
    pub specialties_url: String,
    pub inference_url: String,
    pub inference_model: String,
    pub booking_url: String,
    /// Where messages produced outside a request (idle timeouts) are pushed
    pub outbound_webhook_url: Option<String>,
    pub idle_timeout: Option<Duration>,
    pub greeting_keywords: Vec<String>,
    pub greeting_case_sensitive: bool,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let parsed = |key: &str, default: u64| {
            var(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };
        let list = |key: &str, default: &str| -> Vec<String> {
            var(key)
                .unwrap_or_else(|| default.to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        let idle_secs = parsed("IDLE_TIMEOUT_SECS", 300);

        Self {
            bind_address: var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3008".into()),
            database_url: var("DATABASE_URL"),
            api_key: var("API_KEY"),
            cors_origins: list("CORS_ORIGINS", "*"),
            rate_limit_rps: parsed("RATE_LIMIT_RPS", 100).clamp(1, u32::MAX as u64) as u32,
            specialties_url: var("SPECIALTIES_URL")
                .unwrap_or_else(|| "https://api.finsalu.com/api/get-specialtys".into()),
            inference_url: var("INFERENCE_URL")
                .unwrap_or_else(|| "http://localhost:11434/api/generate".into()),
            inference_model: var("INFERENCE_MODEL").unwrap_or_else(|| "llama3".into()),
            booking_url: var("BOOKING_URL")
                .unwrap_or_else(|| "http://localhost:8000/api/appointments".into()),
            outbound_webhook_url: var("OUTBOUND_WEBHOOK_URL"),
            idle_timeout: (idle_secs > 0).then(|| Duration::from_secs(idle_secs)),
            greeting_keywords: list("GREETING_KEYWORDS", "Hola"),
            greeting_case_sensitive: var("GREETING_CASE_SENSITIVE")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no"))
                .unwrap_or(true),
            http_timeout: Duration::from_secs(parsed("HTTP_TIMEOUT_SECS", 30).max(1)),
        }
    }

    /// Flow settings handed to the transition function
    pub fn flow_context(&self) -> FlowContext {
        FlowContext {
            greeting: Keywords::new(
                self.greeting_keywords.iter().cloned(),
                self.greeting_case_sensitive,
            ),
            idle_timeout: self.idle_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_original_bot() {
        let config = Config::default();
        assert_eq!(config.bind_address, "0.0.0.0:3008");
        assert_eq!(config.inference_model, "llama3");
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(300)));
        assert_eq!(config.greeting_keywords, vec!["Hola"]);
        assert!(config.greeting_case_sensitive);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("IDLE_TIMEOUT_SECS", "0"),
            ("GREETING_KEYWORDS", "Hola, Buenas ,"),
            ("GREETING_CASE_SENSITIVE", "false"),
            ("RATE_LIMIT_RPS", "0"),
            ("DATABASE_URL", "postgres://salu@localhost/salu"),
        ]));
        assert_eq!(config.idle_timeout, None);
        assert_eq!(config.greeting_keywords, vec!["Hola", "Buenas"]);
        assert!(!config.greeting_case_sensitive);
        assert_eq!(config.rate_limit_rps, 1);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://salu@localhost/salu")
        );

        let ctx = config.flow_context();
        assert!(ctx.greeting.matches("buenas"));
        assert_eq!(ctx.idle_timeout, None);
    }
}
