use serde::{Deserialize, Serialize};
use std::env;

use crate::utils::CodeAlphabet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub stripe: StripeConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub codes: CodeConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// First admin account, created at startup when no account has the email.
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    /// Where the hosted checkout sends the customer afterwards.
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.resend.com/emails".to_string(),
            api_key: String::new(),
            from_address: "Lyxdeal <no-reply@lyxdeal.se>".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeConfig {
    pub length: usize,
    pub alphabet: CodeAlphabet,
    /// Batch size used when an admin asks for more codes without a quantity.
    pub default_batch: u32,
}

impl CodeConfig {
    /// Shortest code accepted from configuration.
    pub const MIN_LENGTH: usize = 6;
    /// Width of the `discount_codes.code` column.
    pub const MAX_LENGTH: usize = 32;

    pub fn validate(&self) -> Result<(), String> {
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&self.length) {
            return Err(format!(
                "codes.length must be between {} and {}, got {}",
                Self::MIN_LENGTH,
                Self::MAX_LENGTH,
                self.length
            ));
        }
        if self.default_batch == 0 {
            return Err("codes.default_batch must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            length: 8,
            alphabet: CodeAlphabet::Unambiguous,
            default_batch: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub poll_interval_secs: u64,
    pub max_attempts: u32,
    pub initial_backoff_secs: u64,
    pub max_backoff_secs: u64,
    pub batch_size: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 15,
            max_attempts: 6,
            initial_backoff_secs: 30,
            max_backoff_secs: 3600,
            batch_size: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

fn default_connect_attempts() -> u32 {
    5
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // Without a config file everything comes from the environment
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("Failed to parse config file: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and config.toml was not found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                        connect_attempts: get_env_parse(
                            "DB_CONNECT_ATTEMPTS",
                            default_connect_attempts(),
                        ),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 86_400i64),
                    },
                    stripe: StripeConfig {
                        secret_key: get_env("STRIPE_SECRET_KEY").unwrap_or_default(),
                        webhook_secret: get_env("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
                        success_url: get_env("STRIPE_SUCCESS_URL").unwrap_or_else(|| {
                            "https://lyxdeal.se/purchase-success?session_id={CHECKOUT_SESSION_ID}"
                                .to_string()
                        }),
                        cancel_url: get_env("STRIPE_CANCEL_URL")
                            .unwrap_or_else(|| "https://lyxdeal.se/".to_string()),
                    },
                    email: EmailConfig::default(),
                    codes: CodeConfig::default(),
                    notifications: NotificationConfig::default(),
                    admin: None,
                }
            }
            Err(e) => {
                return Err(format!("Unable to read config file {config_path}: {e}").into());
            }
        };

        // Environment overrides apply even when the file exists
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("STRIPE_SECRET_KEY") {
            config.stripe.secret_key = v;
        }
        if let Ok(v) = env::var("STRIPE_WEBHOOK_SECRET") {
            config.stripe.webhook_secret = v;
        }
        if let Ok(v) = env::var("STRIPE_SUCCESS_URL") {
            config.stripe.success_url = v;
        }
        if let Ok(v) = env::var("STRIPE_CANCEL_URL") {
            config.stripe.cancel_url = v;
        }

        // Email
        if let Ok(v) = env::var("EMAIL_API_URL") {
            config.email.api_url = v;
        }
        if let Ok(v) = env::var("EMAIL_API_KEY") {
            config.email.api_key = v;
        }
        if let Ok(v) = env::var("EMAIL_FROM_ADDRESS") {
            config.email.from_address = v;
        }

        // Discount codes
        if let Ok(v) = env::var("CODE_LENGTH")
            && let Ok(n) = v.parse()
        {
            config.codes.length = n;
        }
        if let Ok(v) = env::var("CODE_ALPHABET")
            && let Ok(a) = v.parse()
        {
            config.codes.alphabet = a;
        }

        if let (Ok(email), Ok(password)) = (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            config.admin = Some(AdminConfig { email, password });
        }

        config.codes.validate()?;
        Ok(config)
    }
}
