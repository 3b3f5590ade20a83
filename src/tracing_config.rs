//! Tracing configuration for the command-line tool.
//!
//! The subscriber is only installed when `PHP_LAZY_PROXY_LOG` (or
//! `RUST_LOG`) is set. Output always goes to stderr so generated source on
//! stdout stays clean.
//!
//! ```bash
//! PHP_LAZY_PROXY_LOG=debug php-lazy-proxy -r classes.json proxy --class 'App\Mailer'
//! PHP_LAZY_PROXY_LOG=debug PHP_LAZY_PROXY_LOG_FORMAT=json php-lazy-proxy -r classes/ ghost 'App\Mailer'
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

pub const LOG_ENV: &str = "PHP_LAZY_PROXY_LOG";
pub const LOG_FORMAT_ENV: &str = "PHP_LAZY_PROXY_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV)
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// `PHP_LAZY_PROXY_LOG` takes precedence over `RUST_LOG`.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var(LOG_ENV) {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

pub fn init_tracing() {
    if std::env::var(LOG_ENV).is_err() && std::env::var("RUST_LOG").is_err() {
        return;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
