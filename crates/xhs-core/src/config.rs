use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{delivery::DeliveryPolicy, domain::Language, errors::Error, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Typed configuration, read from the environment (and an optional `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    // Credentials
    pub telegram_bot_token: String,
    pub gemini_api_key: Option<String>,

    // Generator
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub generation_timeout: Duration,

    // Polling
    pub poll_timeout: Duration,
    pub poll_backoff: Duration,

    // History
    pub history_file: PathBuf,
    pub history_limit: usize,

    // Delivery
    pub telegram_safe_limit: usize,
    pub preview_chars: usize,

    pub default_language: Language,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parse configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);
        let get_u64 = |key: &str| get(key).and_then(|s| s.trim().parse::<u64>().ok());
        let get_usize = |key: &str| get(key).and_then(|s| s.trim().parse::<usize>().ok());

        let Some(telegram_bot_token) = get("TELEGRAM_BOT_TOKEN") else {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        };

        // Optional: generation fails per call (not at startup) when absent.
        let gemini_api_key = get("GEMINI_API_KEY");
        let gemini_model = get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let gemini_api_base = get("GEMINI_API_BASE")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string());
        let generation_timeout =
            Duration::from_millis(get_u64("GENERATION_TIMEOUT_MS").unwrap_or(60_000).max(1));

        let poll_timeout = Duration::from_secs(get_u64("POLL_TIMEOUT_SECS").unwrap_or(30));
        let poll_backoff = Duration::from_millis(get_u64("POLL_BACKOFF_MS").unwrap_or(3_000));

        let history_file = PathBuf::from(
            get("XHS_HISTORY_FILE").unwrap_or_else(|| "xhs-history.jsonl".to_string()),
        );
        let history_limit = get_usize("XHS_HISTORY_LIMIT").unwrap_or(10_000).max(1);

        let telegram_safe_limit = get_usize("TELEGRAM_SAFE_LIMIT").unwrap_or(4_000);
        let preview_chars = get_usize("PREVIEW_CHARS").unwrap_or(600);
        if telegram_safe_limit < 64 {
            return Err(Error::Config(format!(
                "TELEGRAM_SAFE_LIMIT must be at least 64 bytes (got {telegram_safe_limit})"
            )));
        }

        let default_language = match get("DEFAULT_LANGUAGE") {
            None => Language::Zh,
            Some(raw) => Language::parse(&raw).ok_or_else(|| {
                Error::Config(format!("DEFAULT_LANGUAGE must be zh or en (got {raw:?})"))
            })?,
        };

        Ok(Self {
            telegram_bot_token,
            gemini_api_key,
            gemini_model,
            gemini_api_base,
            generation_timeout,
            poll_timeout,
            poll_backoff,
            history_file,
            history_limit,
            telegram_safe_limit,
            preview_chars,
            default_language,
        })
    }

    pub fn delivery_policy(&self) -> DeliveryPolicy {
        DeliveryPolicy {
            max_message_bytes: self.telegram_safe_limit,
            preview_chars: self.preview_chars,
        }
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }
        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
