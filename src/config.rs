use std::time::Duration;

use crate::error::AppError;

/// Runtime settings, loaded once at startup. Every value has a default so
/// the crate runs out of the box with no environment at all.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the file-backed store writes its JSON blobs into.
    pub data_dir: String,
    pub session_ttl_minutes: i64,
    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,
    pub email_timeout_secs: u64,
    /// Extra attempts after the first send fails (0 disables the retry).
    pub email_retries: u32,
    pub smtp_host: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub mail_from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Config {
            data_dir: std::env::var("TCS_DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string()),
            session_ttl_minutes: std::env::var("TCS_SESSION_TTL_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid TCS_SESSION_TTL_MINUTES: {}", e)))?,
            admin_name: std::env::var("TCS_ADMIN_NAME")
                .unwrap_or_else(|_| "TCS Admin".to_string()),
            admin_email: std::env::var("TCS_ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@tcs.uaf".to_string()),
            admin_password: std::env::var("TCS_ADMIN_PASSWORD")
                .unwrap_or_else(|_| "admin123".to_string()),
            email_timeout_secs: std::env::var("TCS_EMAIL_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid TCS_EMAIL_TIMEOUT_SECS: {}", e)))?,
            email_retries: std::env::var("TCS_EMAIL_RETRIES")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid TCS_EMAIL_RETRIES: {}", e)))?,
            smtp_host: std::env::var("TCS_SMTP_HOST").ok(),
            smtp_username: std::env::var("TCS_SMTP_USERNAME").ok(),
            smtp_password: std::env::var("TCS_SMTP_PASSWORD").ok(),
            mail_from: std::env::var("TCS_MAIL_FROM")
                .unwrap_or_else(|_| "The Computing Society <thecomputingsociety@gmail.com>".to_string()),
        })
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_minutes)
    }

    pub fn email_timeout(&self) -> Duration {
        Duration::from_secs(self.email_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: "./data".to_string(),
            session_ttl_minutes: 30,
            admin_name: "TCS Admin".to_string(),
            admin_email: "admin@tcs.uaf".to_string(),
            admin_password: "admin123".to_string(),
            email_timeout_secs: 10,
            email_retries: 1,
            smtp_host: None,
            smtp_username: None,
            smtp_password: None,
            mail_from: "The Computing Society <thecomputingsociety@gmail.com>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_ttl_is_thirty_minutes() {
        let config = Config::default();
        assert_eq!(config.session_ttl(), chrono::Duration::minutes(30));
    }
}
