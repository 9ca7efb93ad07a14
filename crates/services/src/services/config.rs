use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://taskforge.db?mode=rwc";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_IDENTITY_API_BASE: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_GENERATION_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GENERATION_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(&'static str),
}

/// Runtime configuration, assembled from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// `None` means any origin is allowed, matching the upstream deployment.
    pub cors_allowed_origins: Option<Vec<String>>,
    pub identity: IdentityConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub api_base: String,
    pub api_key: SecretString,
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_base: String,
    pub api_key: SecretString,
    pub model: String,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let port = match optional_env("PORT") {
            Some(raw) => parse_port(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Invalid PORT; using default {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        Ok(Config {
            database_url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            host: env_or("HOST", DEFAULT_HOST),
            port,
            cors_allowed_origins: optional_env("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .filter(|origins| !origins.is_empty()),
            identity: IdentityConfig {
                api_base: env_or("IDENTITY_API_BASE", DEFAULT_IDENTITY_API_BASE),
                api_key: required_env("FIREBASE_API_KEY")?.into(),
            },
            generation: GenerationConfig {
                api_base: env_or("GEMINI_API_BASE", DEFAULT_GENERATION_API_BASE),
                api_key: required_env("GEMINI_API_KEY")?.into(),
                model: env_or("GEMINI_MODEL", DEFAULT_GENERATION_MODEL),
            },
        })
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    optional_env(name).unwrap_or_else(|| default.to_string())
}

fn required_env(name: &'static str) -> Result<String, ConfigError> {
    optional_env(name).ok_or(ConfigError::MissingEnv(name))
}

fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse::<u16>().ok().filter(|port| *port != 0)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
