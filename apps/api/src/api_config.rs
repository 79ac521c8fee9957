use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use kinboard_application::DEFAULT_REMINDER_WINDOW_DAYS;
use kinboard_core::AppError;
use kinboard_infrastructure::SmtpTls;
use tracing_subscriber::EnvFilter;

const DEFAULT_REMINDER_INTERVAL_SECONDS: u64 = 600;
const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Debug, Clone)]
pub struct SmtpRuntimeConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub tls: SmtpTls,
}

#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    Console,
    Smtp(SmtpRuntimeConfig),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub database_max_connections: u32,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: Option<String>,
    pub access_token_ttl_minutes: i64,
    pub email_provider: EmailProviderConfig,
    /// `None` disables the reminder scheduler.
    pub reminder_interval: Option<Duration>,
    pub reminder_window_days: u32,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let env = EnvSource(lookup);

        let database_url = env.required("DATABASE_URL")?;
        let database_max_connections = env.parse_or("DATABASE_MAX_CONNECTIONS", 10_u32)?;
        if database_max_connections == 0 {
            return Err(AppError::Validation(
                "DATABASE_MAX_CONNECTIONS must be at least 1".to_owned(),
            ));
        }
        let frontend_url = env.or_default("FRONTEND_URL", "http://localhost:3000");
        let api_host = env.or_default("API_HOST", "127.0.0.1");
        let api_port = env.parse_or("API_PORT", 3001_u16)?;

        let jwt_secret = env.required_non_empty("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            return Err(AppError::Validation(
                "JWT_SECRET must be at least 32 characters".to_owned(),
            ));
        }
        let jwt_issuer = env.or_default("JWT_ISSUER", "kinboard");
        let jwt_audience = env.optional("JWT_AUDIENCE");
        let access_token_ttl_minutes =
            env.parse_or("ACCESS_TOKEN_TTL_MINUTES", DEFAULT_ACCESS_TOKEN_TTL_MINUTES)?;

        let email_provider = match env.or_default("EMAIL_PROVIDER", "console").as_str() {
            "console" => EmailProviderConfig::Console,
            "smtp" => {
                let port = env
                    .required_non_empty("SMTP_PORT")?
                    .parse::<u16>()
                    .map_err(|error| AppError::Validation(format!("invalid SMTP_PORT: {error}")))?;
                let tls = match env.or_default("SMTP_TLS", "starttls").as_str() {
                    "tls" => SmtpTls::Implicit,
                    "starttls" => SmtpTls::StartTls,
                    other => {
                        return Err(AppError::Validation(format!(
                            "SMTP_TLS must be either 'tls' or 'starttls', got '{other}'"
                        )));
                    }
                };
                EmailProviderConfig::Smtp(SmtpRuntimeConfig {
                    host: env.required_non_empty("SMTP_HOST")?,
                    port,
                    username: env.required_non_empty("SMTP_USERNAME")?,
                    password: env.required_non_empty("SMTP_PASSWORD")?,
                    from_address: env.required_non_empty("SMTP_FROM_ADDRESS")?,
                    tls,
                })
            }
            other => {
                return Err(AppError::Validation(format!(
                    "EMAIL_PROVIDER must be either 'console' or 'smtp', got '{other}'"
                )));
            }
        };

        let reminder_interval_seconds =
            env.parse_or("REMINDER_INTERVAL_SECONDS", DEFAULT_REMINDER_INTERVAL_SECONDS)?;
        let reminder_interval =
            (reminder_interval_seconds > 0).then(|| Duration::from_secs(reminder_interval_seconds));
        let reminder_window_days =
            env.parse_or("REMINDER_WINDOW_DAYS", DEFAULT_REMINDER_WINDOW_DAYS)?;

        Ok(Self {
            migrate_only,
            database_url,
            database_max_connections,
            frontend_url,
            api_host,
            api_port,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            access_token_ttl_minutes,
            email_provider,
            reminder_interval,
            reminder_window_days,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

struct EnvSource<F>(F);

impl<F: Fn(&str) -> Option<String>> EnvSource<F> {
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|value| !value.trim().is_empty())
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_owned())
    }

    fn required(&self, name: &str) -> Result<String, AppError> {
        (self.0)(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
    }

    fn required_non_empty(&self, name: &str) -> Result<String, AppError> {
        let value = self.required(name)?;
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{name} must not be empty")));
        }

        Ok(value)
    }

    fn parse_or<T>(&self, name: &str, default: T) -> Result<T, AppError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            Some(value) => value
                .trim()
                .parse::<T>()
                .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
            None => Ok(default),
        }
    }
}
