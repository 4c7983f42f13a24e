//! Application configuration.

use std::time::Duration;

/// Application settings, loaded once at startup.
///
/// The AI credential is read here and injected into the analyzer and
/// generator at construction; nothing reads it again at runtime.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// OpenAI API key; `None` selects the deterministic fallback mode.
    pub openai_api_key: Option<String>,

    /// Chat model used for analysis and generation.
    pub openai_model: String,

    /// Request timeout for AI-backend calls.
    pub ai_timeout: Duration,

    /// Maximum accepted upload size in bytes.
    pub max_file_size: u64,

    /// OCR recognition languages, Tesseract syntax (e.g. "ita+eng").
    pub ocr_languages: String,

    /// Directory for disk-backed object storage.
    pub storage_dir: String,

    /// HTTP listen port.
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: "gpt-3.5-turbo".to_string(),
            ai_timeout: Duration::from_secs(30),
            max_file_size: 100 * 1024 * 1024, // 100MB
            ocr_languages: "ita+eng".to_string(),
            storage_dir: "data/uploads".to_string(),
            server_port: 3000,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment variables, with defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            if !val.trim().is_empty() {
                config.openai_api_key = Some(val);
            }
        }

        if let Ok(val) = std::env::var("OPENAI_MODEL") {
            if !val.trim().is_empty() {
                config.openai_model = val;
            }
        }

        if let Ok(val) = std::env::var("AI_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                config.ai_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(val) = std::env::var("MAX_FILE_SIZE") {
            if let Ok(size) = val.parse::<u64>() {
                config.max_file_size = size;
            }
        }

        if let Ok(val) = std::env::var("OCR_LANGUAGES") {
            if !val.trim().is_empty() {
                config.ocr_languages = val;
            }
        }

        if let Ok(val) = std::env::var("STORAGE_DIR") {
            if !val.trim().is_empty() {
                config.storage_dir = val;
            }
        }

        if let Ok(val) = std::env::var("SERVER_PORT") {
            if let Ok(port) = val.parse::<u16>() {
                config.server_port = port;
            }
        }

        config
    }

    /// Whether an AI backend credential is configured.
    pub fn ai_enabled(&self) -> bool {
        self.openai_api_key.is_some()
    }

    /// Checks a file size against the configured limit.
    pub fn is_size_allowed(&self, size: u64) -> bool {
        size <= self.max_file_size
    }
}
