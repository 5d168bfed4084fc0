use std::collections::HashMap;
use std::{error::Error, io::stdout};

use serde_json::Value;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use poolify_application::infrastructure_config::{Config, LogFormat, LoggingConfig};

const SERVICE_NAME: &str = "poolify-client";

/// Crates whose request-level chatter drowns out balance and gate events.
const HTTP_TARGETS: [&str; 3] = ["hyper", "hyper_util", "reqwest"];

/// Installs the global subscriber; call once, before the client state is built.
///
/// `RUST_LOG` wins over `logging.level` when set.
pub fn setup_logging(config: &Config) -> Result<(), Box<dyn Error>> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter_directives(&config.logging))?,
    };

    match config.logging.format {
        LogFormat::Json => {
            let formatting_layer = BunyanFormattingLayer::with_default_fields(
                SERVICE_NAME.to_string(),
                stdout,
                default_fields(config),
            );

            tracing_subscriber::registry()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(formatting_layer)
                .try_init()?;
        }
        LogFormat::Pretty => {
            let location = config.logging.include_location;
            let format = fmt::format()
                .with_target(true)
                .with_thread_ids(config.logging.include_thread_ids)
                .with_file(location)
                .with_line_number(location)
                .compact();

            tracing_subscriber::fmt()
                .event_format(format)
                .with_env_filter(env_filter)
                .try_init()
                .map_err(|err| err as Box<dyn Error>)?;
        }
    }

    Ok(())
}

fn filter_directives(logging: &LoggingConfig) -> String {
    let mut directives = vec![logging.level.trim().to_string()];
    if logging.quiet_http {
        directives.extend(HTTP_TARGETS.iter().map(|target| format!("{target}=warn")));
    }
    directives.join(",")
}

/// Fields stamped on every JSON line so logs from several deployments can be told apart.
fn default_fields(config: &Config) -> HashMap<String, Value> {
    HashMap::from([
        (
            "environment".to_string(),
            Value::String(config.environment.env.clone()),
        ),
        (
            "backend".to_string(),
            Value::String(config.backend.base_url.clone()),
        ),
    ])
}
