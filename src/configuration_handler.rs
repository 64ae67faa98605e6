use crate::configuration::Configuration;
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Book a meeting against a remote booking API")]
pub struct ConfigurationHandler {
    /// Base URL of the booking API
    #[arg(long, env = "BOOKING_API_URL", default_value = "http://localhost:5000")]
    api_url: String,

    /// Attempts per slot fetch before giving up
    #[arg(long, env = "BOOKING_MAX_ATTEMPTS", default_value_t = 3)]
    max_attempts: u32,

    /// Back-off unit in milliseconds, multiplied by the failed attempt number
    #[arg(long, env = "BOOKING_RETRY_DELAY_MS", default_value_t = 500)]
    retry_delay_ms: u64,

    /// Seconds after which a running slot fetch stops blocking the view
    #[arg(long, env = "BOOKING_SAFETY_TIMEOUT_SECS", default_value_t = 12)]
    safety_timeout_secs: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "BOOKING_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    request_timeout_secs: u64,

    /// Enable the diagnostic action (on by default in debug builds)
    #[arg(long, env = "BOOKING_DIAGNOSTICS")]
    diagnostics: Option<bool>,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn api_base_url(&self) -> String {
        self.api_url.clone()
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    fn safety_timeout(&self) -> Duration {
        Duration::from_secs(self.safety_timeout_secs)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn diagnostics_enabled(&self) -> bool {
        self.diagnostics.unwrap_or(cfg!(debug_assertions))
    }
}
