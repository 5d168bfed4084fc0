use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use poolify_application::error::{AppError, AppResult};
use poolify_application::infrastructure_config::Config;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const ENV_PREFIX: &str = "POOLIFY_";
/// Points at one extra config file, e.g. a per-deployment `staging.toml`.
const CONFIG_PATH_VAR: &str = "POOLIFY_CONFIG";

/// Layers defaults, `config.toml`, `config.json`, the `POOLIFY_CONFIG` file and
/// `POOLIFY_*` variables, then validates.
///
/// Nested keys use a double underscore, e.g. `POOLIFY_BACKEND__BASE_URL`.
pub fn load_config() -> AppResult<Config> {
    generate_env_template_if_missing()?;
    dotenvy::dotenv().ok();

    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if Path::new("config.toml").exists() {
        figment = figment.merge(Toml::file("config.toml"));
    }

    if Path::new("config.json").exists() {
        figment = figment.merge(Json::file("config.json"));
    }

    if let Some(path) = explicit_config_path()? {
        info!(path = %path.display(), "Loading deployment config");
        figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => figment.merge(Json::file(path)),
            _ => figment.merge(Toml::file(path)),
        };
    }

    let config: Config = figment
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]).split("__"))
        .extract()
        .map_err(|e| AppError::ConfigError {
            message: format!("Failed to load configuration: {e}"),
        })?;

    config.validate()?;
    Ok(config)
}

// Unlike the default files, a named file that is missing is an error.
fn explicit_config_path() -> AppResult<Option<PathBuf>> {
    let Some(path) = env::var_os(CONFIG_PATH_VAR).map(PathBuf::from) else {
        return Ok(None);
    };
    if !path.is_file() {
        return Err(AppError::ConfigError {
            message: format!("{CONFIG_PATH_VAR} points at a missing file: {}", path.display()),
        });
    }
    Ok(Some(path))
}

fn generate_env_template_if_missing() -> AppResult<()> {
    let env_file = ".env";
    let template_file = ".env.example";

    if Path::new(env_file).exists() || !Path::new(template_file).exists() {
        return Ok(());
    }

    fs::copy(template_file, env_file).map_err(|e| AppError::ConfigError {
        message: format!("Failed to generate .env file from template: {e}"),
    })?;

    info!("Generated .env from template");
    Ok(())
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;
    use poolify_application::infrastructure_config::LogFormat;

    #[test]
    fn defaults_load_without_any_files() {
        Jail::expect_with(|_jail| {
            let config = load_config().map_err(|e| e.to_string())?;
            assert_eq!(config.backend.base_url, "http://localhost:8000");
            assert_eq!(config.pricing.variant_credits_per_image, 2);
            assert_eq!(config.checkout.packs.len(), 3);
            Ok(())
        });
    }

    #[test]
    fn files_and_env_are_layered_in_order() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [backend]
                base_url = "https://api.poolify.test"
                request_timeout_secs = 30

                [logging]
                level = "debug"
                format = "json"
                "#,
            )?;
            jail.create_file("config.json", r#"{"logging": {"level": "warn"}}"#)?;
            jail.set_env("POOLIFY_PRICING__VARIANT_CREDITS_PER_IMAGE", "3");

            let config = load_config().map_err(|e| e.to_string())?;
            assert_eq!(config.backend.base_url, "https://api.poolify.test");
            assert_eq!(config.backend.request_timeout_secs, Some(30));
            assert_eq!(config.logging.level, "warn");
            assert!(matches!(config.logging.format, LogFormat::Json));
            assert_eq!(config.pricing.variant_credits_per_image, 3);
            assert_eq!(config.pricing.job_credits_per_design, 1);
            Ok(())
        });
    }

    #[test]
    fn invalid_values_fail_validation() {
        Jail::expect_with(|jail| {
            jail.set_env("POOLIFY_BACKEND__BASE_URL", "ftp://files.poolify.test");
            assert!(matches!(load_config(), Err(AppError::ConfigError { .. })));
            Ok(())
        });
    }

    #[test]
    fn deployment_file_overrides_defaults_but_not_env() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[environment]\nenv = \"local\"\n")?;
            jail.create_file(
                "staging.json",
                r#"{"environment": {"env": "staging"}, "logging": {"include_thread_ids": true}, "pricing": {"download_credits": 2}}"#,
            )?;
            jail.set_env("POOLIFY_CONFIG", "staging.json");
            jail.set_env("POOLIFY_PRICING__DOWNLOAD_CREDITS", "5");

            let config = load_config().map_err(|e| e.to_string())?;
            assert_eq!(config.environment.env, "staging");
            assert!(config.logging.include_thread_ids);
            assert!(config.logging.quiet_http);
            assert_eq!(config.pricing.download_credits, 5);
            Ok(())
        });
    }

    #[test]
    fn missing_deployment_file_is_an_error() {
        Jail::expect_with(|jail| {
            jail.set_env("POOLIFY_CONFIG", "nowhere.toml");
            let err = load_config().unwrap_err();
            assert!(
                matches!(&err, AppError::ConfigError { message } if message.contains("nowhere.toml")),
                "unexpected error: {err:?}"
            );
            Ok(())
        });
    }

    #[test]
    fn env_template_is_copied_once() {
        Jail::expect_with(|jail| {
            jail.create_file(".env.example", "EXAMPLE_API_KEY=changeme\n")?;
            load_config().map_err(|e| e.to_string())?;
            assert!(Path::new(".env").exists());

            jail.create_file(".env", "# edited\n")?;
            load_config().map_err(|e| e.to_string())?;
            assert_eq!(
                fs::read_to_string(".env").map_err(|e| e.to_string())?,
                "# edited\n"
            );
            Ok(())
        });
    }
}
