use std::path::PathBuf;

use crate::translate::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_DB_PATH: &str = "uploaded_data.db";

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
pub const DB_PATH_VAR: &str = "ASKCSV_DB";

/// Process-wide settings, read once at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_key: non_empty(API_KEY_VAR),
            model: non_empty(MODEL_VAR).unwrap_or(defaults.model),
            base_url: non_empty(BASE_URL_VAR).unwrap_or(defaults.base_url),
            db_path: non_empty(DB_PATH_VAR).map(PathBuf::from).unwrap_or(defaults.db_path),
        }
    }

    /// Translator client for these settings. A missing key surfaces when
    /// the first question is translated.
    pub fn translator(&self) -> GeminiClient {
        GeminiClient::new(self.api_key.clone().unwrap_or_default())
            .with_model(self.model.clone())
            .with_base_url(self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.db_path, PathBuf::from("uploaded_data.db"));
    }

    #[test]
    fn test_reads_variables() {
        let vars: HashMap<&str, &str> = [
            (API_KEY_VAR, "secret"),
            (MODEL_VAR, "gemini-1.5-flash"),
            (DB_PATH_VAR, "/tmp/house.db"),
            (BASE_URL_VAR, "  "),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.db_path, PathBuf::from("/tmp/house.db"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.translator().model(), "gemini-1.5-flash");
    }
}
