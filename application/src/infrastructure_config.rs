use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::error::{AppError, AppResult};
use domain::checkout::CreditPack;
use domain::credits::CostSchedule;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub pricing: CostSchedule,
    pub checkout: CheckoutConfig,
    pub balance_events: BalanceEventsConfig,
    pub logging: LoggingConfig,
    pub environment: EnvironmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    /// Unset means a paid action may stay Busy until the backend answers.
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl BackendConfig {
    pub fn parsed_base_url(&self) -> AppResult<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| AppError::ConfigError {
            message: format!("Invalid backend base_url '{}': {e}", self.base_url),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::ConfigError {
                message: format!("backend base_url must be http(s), got '{}'", url.scheme()),
            });
        }

        Ok(url)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    pub packs: Vec<CreditPack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceEventsConfig {
    pub log_snapshots: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub include_location: bool,
    pub include_thread_ids: bool,
    /// Caps the HTTP stack's own logs at `warn` unless `RUST_LOG` says otherwise.
    pub quiet_http: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogFormat {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "pretty")]
    Pretty,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            packs: vec![
                CreditPack::new("price_1SYDbXD4euJjAUTF6xIyUelY", "10 credits", 10),
                CreditPack::new("price_1SYDcrD4euJjAUTF1oR0bWsA", "25 credits", 25),
                CreditPack::new("price_1SYDdND4euJjAUTFzzRQYrpT", "60 credits", 60),
            ],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://localhost:8000".to_string(),
                request_timeout_secs: Some(60),
                connect_timeout_secs: 10,
                user_agent: concat!("poolify-client/", env!("CARGO_PKG_VERSION")).to_string(),
            },
            pricing: CostSchedule::default(),
            checkout: CheckoutConfig::default(),
            balance_events: BalanceEventsConfig {
                log_snapshots: false,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
                include_location: false,
                include_thread_ids: false,
                quiet_http: true,
            },
            environment: EnvironmentConfig {
                env: "development".to_string(),
            },
        }
    }
}

impl Config {
    pub fn validate(&self) -> AppResult<()> {
        self.backend.parsed_base_url()?;

        if self.backend.request_timeout_secs == Some(0) {
            return Err(AppError::ConfigError {
                message: "request_timeout_secs must be greater than 0 when set".to_string(),
            });
        }

        if self.backend.connect_timeout_secs == 0 {
            return Err(AppError::ConfigError {
                message: "connect_timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.backend.user_agent.trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "user_agent cannot be empty".to_string(),
            });
        }

        if self.pricing.variant_credits_per_image == 0 || self.pricing.job_credits_per_design == 0
        {
            return Err(AppError::ConfigError {
                message: "Variant and job costs must be greater than 0".to_string(),
            });
        }

        if self.checkout.packs.is_empty() {
            return Err(AppError::ConfigError {
                message: "At least one credit pack must be configured".to_string(),
            });
        }

        let mut seen_price_ids = HashSet::new();
        for pack in &self.checkout.packs {
            if pack.price_id.trim().is_empty() {
                return Err(AppError::ConfigError {
                    message: "Credit pack price_id cannot be empty".to_string(),
                });
            }
            if pack.credits == 0 {
                return Err(AppError::ConfigError {
                    message: format!("Credit pack '{}' must grant credits", pack.price_id),
                });
            }
            if !seen_price_ids.insert(pack.price_id.as_str()) {
                return Err(AppError::ConfigError {
                    message: format!("Duplicate credit pack price_id: '{}'", pack.price_id),
                });
            }
        }

        Ok(())
    }
}
