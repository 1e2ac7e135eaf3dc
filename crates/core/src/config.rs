use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub weather: WeatherConfig,
    pub market: MarketConfig,
    pub advice: AdviceConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct WeatherConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct MarketConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AdviceConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub weather_api_key: Option<String>,
    pub market_api_key: Option<String>,
    pub advice_api_key: Option<String>,
    pub advice_base_url: Option<String>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://cropwise.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            weather: WeatherConfig {
                api_key: None,
                base_url: "http://api.weatherapi.com/v1".to_string(),
                timeout_secs: 10,
            },
            market: MarketConfig {
                api_key: None,
                base_url: "https://api.marketstack.com/v1".to_string(),
                timeout_secs: 10,
            },
            advice: AdviceConfig {
                api_key: None,
                base_url: "http://localhost:11434".to_string(),
                model: "llama3.1".to_string(),
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("cropwise.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(weather) = patch.weather {
            if let Some(weather_api_key_value) = weather.api_key {
                self.weather.api_key = Some(secret_value(weather_api_key_value));
            }
            if let Some(base_url) = weather.base_url {
                self.weather.base_url = base_url;
            }
            if let Some(timeout_secs) = weather.timeout_secs {
                self.weather.timeout_secs = timeout_secs;
            }
        }

        if let Some(market) = patch.market {
            if let Some(market_api_key_value) = market.api_key {
                self.market.api_key = Some(secret_value(market_api_key_value));
            }
            if let Some(base_url) = market.base_url {
                self.market.base_url = base_url;
            }
            if let Some(timeout_secs) = market.timeout_secs {
                self.market.timeout_secs = timeout_secs;
            }
        }

        if let Some(advice) = patch.advice {
            if let Some(advice_api_key_value) = advice.api_key {
                self.advice.api_key = Some(secret_value(advice_api_key_value));
            }
            if let Some(base_url) = advice.base_url {
                self.advice.base_url = base_url;
            }
            if let Some(model) = advice.model {
                self.advice.model = model;
            }
            if let Some(timeout_secs) = advice.timeout_secs {
                self.advice.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("CROPWISE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("CROPWISE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("CROPWISE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("CROPWISE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("CROPWISE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CROPWISE_WEATHER_API_KEY") {
            self.weather.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("CROPWISE_WEATHER_BASE_URL") {
            self.weather.base_url = value;
        }
        if let Some(value) = read_env("CROPWISE_WEATHER_TIMEOUT_SECS") {
            self.weather.timeout_secs = parse_u64("CROPWISE_WEATHER_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CROPWISE_MARKET_API_KEY") {
            self.market.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("CROPWISE_MARKET_BASE_URL") {
            self.market.base_url = value;
        }
        if let Some(value) = read_env("CROPWISE_MARKET_TIMEOUT_SECS") {
            self.market.timeout_secs = parse_u64("CROPWISE_MARKET_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CROPWISE_ADVICE_API_KEY") {
            self.advice.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("CROPWISE_ADVICE_BASE_URL") {
            self.advice.base_url = value;
        }
        if let Some(value) = read_env("CROPWISE_ADVICE_MODEL") {
            self.advice.model = value;
        }
        if let Some(value) = read_env("CROPWISE_ADVICE_TIMEOUT_SECS") {
            self.advice.timeout_secs = parse_u64("CROPWISE_ADVICE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CROPWISE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("CROPWISE_SERVER_PORT") {
            self.server.port = parse_u16("CROPWISE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("CROPWISE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("CROPWISE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("CROPWISE_LOGGING_LEVEL").or_else(|| read_env("CROPWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CROPWISE_LOGGING_FORMAT").or_else(|| read_env("CROPWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(weather_api_key) = overrides.weather_api_key {
            self.weather.api_key = Some(secret_value(weather_api_key));
        }
        if let Some(market_api_key) = overrides.market_api_key {
            self.market.api_key = Some(secret_value(market_api_key));
        }
        if let Some(advice_api_key) = overrides.advice_api_key {
            self.advice.api_key = Some(secret_value(advice_api_key));
        }
        if let Some(advice_base_url) = overrides.advice_base_url {
            self.advice.base_url = advice_base_url;
        }
        if let Some(server_port) = overrides.server_port {
            self.server.port = server_port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_http_section("weather", &self.weather.base_url, self.weather.timeout_secs)?;
        validate_http_section("market", &self.market.base_url, self.market.timeout_secs)?;
        validate_http_section("advice", &self.advice.base_url, self.advice.timeout_secs)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("cropwise.toml"), PathBuf::from("config/cropwise.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_http_section(section: &str, base_url: &str, timeout_secs: u64) -> Result<(), ConfigError> {
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{section}.base_url must start with http:// or https://"
        )));
    }

    if timeout_secs == 0 || timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "{section}.timeout_secs must be in range 1..=300"
        )));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    weather: Option<HttpProviderPatch>,
    market: Option<HttpProviderPatch>,
    advice: Option<AdvicePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct HttpProviderPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AdvicePatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid_without_any_file_or_env() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.database.url == "sqlite://cropwise.db", "default database url")?;
        ensure(config.weather.api_key.is_none(), "weather key defaults to unset")?;
        ensure(config.server.port == 8080, "default server port")?;
        Ok(())
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_WEATHER_API_KEY", "wx-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("cropwise.toml");
            fs::write(
                &path,
                r#"
[weather]
api_key = "${TEST_WEATHER_API_KEY}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            let api_key = config
                .weather
                .api_key
                .as_ref()
                .map(|key| key.expose_secret().to_owned())
                .unwrap_or_default();
            ensure(api_key == "wx-from-env", "weather key should be loaded from environment")?;
            Ok(())
        })();

        clear_vars(&["TEST_WEATHER_API_KEY"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("CROPWISE_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("CROPWISE_MARKET_API_KEY", "mk-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("cropwise.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[market]
api_key = "mk-from-file"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            let market_key = config
                .market
                .api_key
                .as_ref()
                .map(|key| key.expose_secret().to_owned())
                .unwrap_or_default();
            ensure(market_key == "mk-from-env", "env market key should win over file")?;
            Ok(())
        })();

        clear_vars(&["CROPWISE_DATABASE_URL", "CROPWISE_MARKET_API_KEY"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("CROPWISE_LOG_LEVEL", "warn");
        env::set_var("CROPWISE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "log level should come from env alias")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "log format should come from env alias",
            )?;
            Ok(())
        })();

        clear_vars(&["CROPWISE_LOG_LEVEL", "CROPWISE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn validation_rejects_non_http_provider_urls() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("CROPWISE_WEATHER_BASE_URL", "ftp://weather.example.com");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("weather.base_url")
            );
            ensure(has_message, "validation failure should mention weather.base_url")
        })();

        clear_vars(&["CROPWISE_WEATHER_BASE_URL"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("CROPWISE_ADVICE_API_KEY", "advice-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(
                !debug.contains("advice-secret-value"),
                "debug output should not contain the advice key",
            )?;
            Ok(())
        })();

        clear_vars(&["CROPWISE_ADVICE_API_KEY"]);
        result
    }
}
