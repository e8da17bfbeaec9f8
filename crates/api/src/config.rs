use std::path::PathBuf;
use std::str::FromStr;

/// A configuration value could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins; `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Postgres URL. Unset means an in-memory session store.
    pub database_url: Option<String>,
    pub exercise_models_path: PathBuf,
    pub diet_models_path: PathBuf,
    /// Base URL of the dish detector service.
    pub dish_detector_url: Option<String>,
    /// Minimum confidence for a detection to be reported.
    pub detection_confidence: f64,
    /// Base URL of the chat assistant service.
    pub assistant_url: Option<String>,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            cors_origins: vec!["*".into()],
            request_timeout_secs: 30,
            database_url: None,
            exercise_models_path: PathBuf::from("models/exercise"),
            diet_models_path: PathBuf::from("models/diet"),
            dish_detector_url: None,
            detection_confidence: 0.25,
            assistant_url: None,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default            |
    /// |------------------------|--------------------|
    /// | `HOST`                 | `0.0.0.0`          |
    /// | `PORT`                 | `8000`             |
    /// | `CORS_ORIGINS`         | `*`                |
    /// | `REQUEST_TIMEOUT_SECS` | `30`               |
    /// | `DATABASE_URL`         | unset              |
    /// | `EXERCISE_MODELS_PATH` | `models/exercise`  |
    /// | `DIET_MODELS_PATH`     | `models/diet`      |
    /// | `DISH_DETECTOR_URL`    | unset              |
    /// | `DETECTION_CONFIDENCE` | `0.25`             |
    /// | `ASSISTANT_URL`        | unset              |
    /// | `MAX_UPLOAD_BYTES`     | `10485760`         |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let cors_origins = match get("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_origins,
        };

        let detection_confidence: f64 =
            parse(&get, "DETECTION_CONFIDENCE", "a number between 0 and 1")?
                .unwrap_or(defaults.detection_confidence);
        if !(0.0..=1.0).contains(&detection_confidence) {
            return Err(ConfigError::Invalid {
                var: "DETECTION_CONFIDENCE",
                expected: "a number between 0 and 1",
                value: detection_confidence.to_string(),
            });
        }

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse(&get, "PORT", "a valid u16")?.unwrap_or(defaults.port),
            cors_origins,
            request_timeout_secs: parse(&get, "REQUEST_TIMEOUT_SECS", "a valid u64")?
                .unwrap_or(defaults.request_timeout_secs),
            database_url: get("DATABASE_URL"),
            exercise_models_path: get("EXERCISE_MODELS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.exercise_models_path),
            diet_models_path: get("DIET_MODELS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.diet_models_path),
            dish_detector_url: get("DISH_DETECTOR_URL"),
            detection_confidence,
            assistant_url: get("ASSISTANT_URL"),
            max_upload_bytes: parse(&get, "MAX_UPLOAD_BYTES", "a byte count")?
                .unwrap_or(defaults.max_upload_bytes),
        })
    }
}

fn parse<T, G>(get: &G, var: &'static str, expected: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    get(var)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::Invalid { var, expected, value })
        })
        .transpose()
}
