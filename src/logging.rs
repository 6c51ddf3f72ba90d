use std::str::FromStr;

use color_eyre::eyre::{self, Result, eyre};
use tracing::Level;

use crate::config::LoggingConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = color_eyre::eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(eyre!("unknown log format `{other}` (expected text or json)")),
        }
    }
}

pub fn parse_level(level: &str) -> Result<Level> {
    Level::from_str(level.trim()).map_err(|_| {
        eyre!("unknown log level `{level}` (expected trace, debug, info, warn or error)")
    })
}

/// Level and format to install. Values that don't parse fall back to
/// `info` and `text` and are kept in `rejected` so they can be logged once
/// the subscriber is up.
#[derive(Debug, PartialEq)]
pub struct LogSettings {
    pub level: Level,
    pub format: LogFormat,
    pub rejected: Vec<String>,
}

impl LogSettings {
    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut rejected = Vec::new();
        let level = parse_level(&config.level).unwrap_or_else(|err| {
            rejected.push(err.to_string());
            Level::INFO
        });
        let format = config.format.parse().unwrap_or_else(|err: eyre::Report| {
            rejected.push(err.to_string());
            LogFormat::Text
        });
        LogSettings {
            level,
            format,
            rejected,
        }
    }
}

/// Install the global stderr subscriber. Only a second installation fails.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let settings = LogSettings::from_config(config);

    let builder = tracing_subscriber::fmt()
        .with_max_level(settings.level)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = match settings.format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => {
            tracing::subscriber::set_global_default(builder.with_ansi(false).json().finish())
        }
    };
    installed.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))?;

    for reason in &settings.rejected {
        tracing::warn!(%reason, "ignoring logging setting, using default");
    }
    Ok(())
}
