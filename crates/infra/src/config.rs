use tracing::{info, log::warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Public base url of the application, used to build payment link
    /// redirect urls embedded in reminder emails
    pub app_url: String,
    /// From address for outgoing reminder emails
    pub email_from: String,
    /// Api key for the email provider. When absent, sends are skipped
    /// with a warning instead of failing, which is useful locally.
    pub resend_api_key: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        let default_port = "5000";
        let port = std::env::var("PORT").unwrap_or(default_port.into());
        let port = match port.parse::<usize>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                default_port.parse::<usize>().unwrap()
            }
        };

        let app_url = std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:5000".into());
        let email_from =
            std::env::var("EMAIL_FROM").unwrap_or_else(|_| "no-reply@example.com".into());
        let resend_api_key = match std::env::var("RESEND_API_KEY") {
            Ok(key) => Some(key),
            Err(_) => {
                info!("Did not find RESEND_API_KEY environment variable. Email sends will be skipped.");
                None
            }
        };

        Self {
            port,
            app_url,
            email_from,
            resend_api_key,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
