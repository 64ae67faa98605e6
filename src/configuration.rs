use std::time::Duration;

pub trait Configuration: Clone + Send + Sync + 'static {
    fn api_base_url(&self) -> String;
    fn max_attempts(&self) -> u32;
    fn retry_base_delay(&self) -> Duration;
    fn safety_timeout(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
    fn diagnostics_enabled(&self) -> bool;
}

/// Values used by the booking page when nothing else is configured.
#[derive(Debug, Clone)]
pub struct DefaultConfiguration;

impl Configuration for DefaultConfiguration {
    fn api_base_url(&self) -> String {
        "http://localhost:5000".into()
    }

    fn max_attempts(&self) -> u32 {
        3
    }

    fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(500)
    }

    fn safety_timeout(&self) -> Duration {
        Duration::from_secs(12)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(10)
    }

    fn diagnostics_enabled(&self) -> bool {
        cfg!(debug_assertions)
    }
}
