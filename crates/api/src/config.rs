use ankibridge_core::validation::{Strictness, ValidationConfig};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `8385`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Anki-Connect endpoint and defaults.
    pub bridge: BridgeConfig,
}

/// Settings for the Anki-Connect connection and card validation defaults.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Base URL of the local Anki-Connect add-on.
    pub anki_connect_url: String,
    /// Anki-Connect API version sent with every request.
    pub anki_connect_version: u32,
    /// Deck used when a request does not name one.
    pub default_deck: String,
    /// Default validation policy, overridable per request.
    pub validation: ValidationConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                  |
    /// |-------------------------|--------------------------|
    /// | `HOST`                  | `127.0.0.1`              |
    /// | `PORT`                  | `8385`                   |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                     |
    /// | `ANKI_CONNECT_URL`      | `http://localhost:8765`  |
    /// | `ANKI_CONNECT_VERSION`  | `6`                      |
    /// | `DEFAULT_DECK`          | `Default`                |
    /// | `VALIDATION_STRICTNESS` | `moderate`               |
    /// | `MAX_ANSWER_WORDS`      | `50`                     |
    /// | `MAX_CLOZE_DELETIONS`   | `3`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8385".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            bridge: BridgeConfig::from_env(),
        }
    }
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        let anki_connect_url =
            std::env::var("ANKI_CONNECT_URL").unwrap_or_else(|_| "http://localhost:8765".into());

        let anki_connect_version: u32 = std::env::var("ANKI_CONNECT_VERSION")
            .unwrap_or_else(|_| "6".into())
            .parse()
            .expect("ANKI_CONNECT_VERSION must be a valid u32");

        let default_deck = std::env::var("DEFAULT_DECK").unwrap_or_else(|_| "Default".into());

        let strictness = match std::env::var("VALIDATION_STRICTNESS") {
            Ok(raw) => Strictness::parse(&raw).unwrap_or_else(|| {
                panic!("VALIDATION_STRICTNESS must be strict, moderate, or lenient, got '{raw}'")
            }),
            Err(_) => Strictness::Moderate,
        };

        let max_answer_words: u32 = std::env::var("MAX_ANSWER_WORDS")
            .unwrap_or_else(|_| "50".into())
            .parse()
            .expect("MAX_ANSWER_WORDS must be a valid u32");

        let max_cloze_deletions: u32 = std::env::var("MAX_CLOZE_DELETIONS")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("MAX_CLOZE_DELETIONS must be a valid u32");

        Self {
            anki_connect_url,
            anki_connect_version,
            default_deck,
            validation: ValidationConfig {
                strictness,
                max_answer_words,
                max_cloze_deletions,
            },
        }
    }

    /// The default validation policy with an optional per-request
    /// strictness override applied.
    pub fn validation_with(&self, strictness: Option<Strictness>) -> ValidationConfig {
        let mut config = self.validation.clone();
        if let Some(strictness) = strictness {
            config.strictness = strictness;
        }
        config
    }
}
