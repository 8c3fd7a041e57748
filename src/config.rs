use crate::error::AppError;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_PROGRESS_TICK_MS: u64 = 2000;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub request_timeout: Duration,
    pub progress_tick: Duration,
    pub download_dir: PathBuf,
    pub share_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        load_dotenv_layers();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = lookup("TRYON_BACKEND_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::config("missing required env var: TRYON_BACKEND_URL"))?;

        let request_timeout = Duration::from_secs(read_u64(
            &lookup,
            "TRYON_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);
        let progress_tick = Duration::from_millis(read_u64(
            &lookup,
            "TRYON_PROGRESS_TICK_MS",
            DEFAULT_PROGRESS_TICK_MS,
        )?);

        let download_dir = lookup("TRYON_DOWNLOAD_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let share_url = lookup("TRYON_SHARE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| backend_url.clone());

        Ok(Self {
            backend_url,
            request_timeout,
            progress_tick,
            download_dir,
            share_url,
        })
    }

    pub fn api_base(&self) -> String {
        format!("{}/api", self.backend_url)
    }
}

/// Installs the process-wide configuration. Only the first call succeeds.
pub fn init(config: AppConfig) -> Result<&'static AppConfig, AppError> {
    CONFIG
        .set(config)
        .map_err(|_| AppError::config("configuration already initialised"))?;
    CONFIG
        .get()
        .ok_or_else(|| AppError::config("configuration not initialised"))
}

fn read_u64<F>(lookup: &F, key: &str, default: u64) -> Result<u64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) => match v.trim().parse::<u64>() {
            Ok(0) => Err(AppError::config(format!("{key} must be greater than zero"))),
            Ok(n) => Ok(n),
            Err(e) => Err(AppError::config(format!("invalid {key}: {e}"))),
        },
        None => Ok(default),
    }
}

fn load_dotenv_layers() {
    for path in [".env", "../.env"] {
        let _ = dotenvy::from_path(path);
    }
}
