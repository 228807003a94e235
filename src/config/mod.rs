use std::{env, str::FromStr, time::Duration};

use crate::error::{AppError, Result};

/// The place color swatch (the 16-color palette). Changing these entries is
/// dangerous: clients validate against the exact strings the settings payload
/// carries, and every stored order image was authored from them.
pub const COLOR_SWATCH: [&str; 16] = [
    "#ffffff", "#e4e4e4", "#888888", "#222222", "#e4b4ca", "#d4361e", "#db993e", "#8e705d",
    "#e6d84e", "#a3dc67", "#4aba38", "#7fcbd0", "#5880a8", "#3919d1", "#c27ad0", "#742671",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub board: BoardConfig,
    pub payments: PaymentsConfig,
    pub rate_limit: RateLimitConfig,
    pub tasks: TasksConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_concurrent_requests: usize,
    /// Denies all inbound traffic ahead of any other admission check.
    pub maintenance: bool,
}

#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Side length of the square board, in pixels. The board holds length² cells.
    pub length: u32,
}

#[derive(Debug, Clone)]
pub struct PaymentsConfig {
    /// When set, invoices are simulated and auto-paid after `simulate_delay`.
    pub simulate: bool,
    pub simulate_delay: Duration,
    /// Delay before re-subscribing after the payment event stream closes.
    pub resubscribe_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
    pub skip: bool,
}

#[derive(Debug, Clone)]
pub struct TasksConfig {
    pub stats_interval: Duration,
    pub reaper_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                host: env_or("HOST", "127.0.0.1"),
                port: env_or_parse("PORT", 3000)?,
                cors_allowed_origins: env_list("CORS_ALLOWED_ORIGINS", vec!["".into()]),
                max_concurrent_requests: env_or_parse("SERVER_MAX_CONCURRENT_REQUESTS", 100)?,
                maintenance: env_flag("MAINTENANCE"),
            },
            board: BoardConfig {
                length: env_or_parse("BOARD_LENGTH", 1000)?,
            },
            payments: PaymentsConfig {
                simulate: env_flag("SIMULATE_PAYMENTS"),
                simulate_delay: Duration::from_millis(env_or_parse(
                    "SIMULATE_PAYMENT_DELAY_MS",
                    1000,
                )?),
                resubscribe_delay: Duration::from_secs(env_or_parse(
                    "PAYMENT_RESUBSCRIBE_DELAY_SECS",
                    5,
                )?),
            },
            rate_limit: RateLimitConfig {
                window: Duration::from_secs(env_or_parse("RATE_LIMIT_WINDOW_SECS", 60)?),
                max_requests: env_or_parse("RATE_LIMIT_REQUESTS", 20)?,
                skip: env_flag("SKIP_RATE_LIMIT"),
            },
            tasks: TasksConfig {
                stats_interval: Duration::from_secs(env_or_parse("STATS_INTERVAL_SECS", 1)?),
                reaper_interval: Duration::from_secs(env_or_parse("REAPER_INTERVAL_SECS", 3600)?),
            },
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.board.length == 0 {
            return Err(AppError::InvalidParams(
                "Board length must be positive".into(),
            ));
        }

        if self.rate_limit.max_requests == 0 {
            return Err(AppError::InvalidParams(
                "Rate limit must allow at least one request".into(),
            ));
        }

        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|_| AppError::InvalidParams(format!("Invalid value for {key}"))),
        Err(_) => Ok(default),
    }
}

fn env_flag(key: &str) -> bool {
    matches!(
        env::var(key).as_deref(),
        Ok("yes") | Ok("true") | Ok("1") | Ok("on")
    )
}

fn env_list(key: &str, default: Vec<String>) -> Vec<String> {
    env::var(key)
        .map(|val| {
            val.split(',')
                .map(|str_val| str_val.trim().to_string())
                .collect()
        })
        .unwrap_or(default)
}
